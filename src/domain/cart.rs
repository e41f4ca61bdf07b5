//! Cart totals and the page slots they are written into.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::envelope::js_text;
use crate::view::selectors;

/// Totals returned by the "remove from cart" endpoint.
///
/// A field the server leaves out stays `None`; its slot on the page is left
/// as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CartTotals {
    #[serde(rename = "total-payable", default, deserialize_with = "display_text")]
    pub payable: Option<String>,
    #[serde(rename = "total-actual-price", default, deserialize_with = "display_text")]
    pub actual_price: Option<String>,
    #[serde(rename = "total-discount-price", default, deserialize_with = "display_text")]
    pub discount_price: Option<String>,
    #[serde(rename = "total-shipping-price", default, deserialize_with = "display_text")]
    pub shipping_price: Option<String>,
}

fn display_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| js_text(&v)))
}

/// Every element a total is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TotalTarget {
    /// `.total-payable` (summary line)
    PayableSummary,
    /// `#proceed-to-pay-btn span`
    ProceedButton,
    ActualPrice,
    DiscountPrice,
    ShippingPrice,
    /// `#total-payable` (order table)
    Payable,
}

impl TotalTarget {
    /// Write order used by the cart page.
    pub const ALL: [TotalTarget; 6] = [
        TotalTarget::PayableSummary,
        TotalTarget::ProceedButton,
        TotalTarget::ActualPrice,
        TotalTarget::DiscountPrice,
        TotalTarget::ShippingPrice,
        TotalTarget::Payable,
    ];

    pub fn selector(&self) -> &'static str {
        match self {
            TotalTarget::PayableSummary => selectors::TOTAL_PAYABLE_CLASS,
            TotalTarget::ProceedButton => selectors::PROCEED_TO_PAY_SPAN,
            TotalTarget::ActualPrice => selectors::TOTAL_ACTUAL_PRICE,
            TotalTarget::DiscountPrice => selectors::TOTAL_DISCOUNT_PRICE,
            TotalTarget::ShippingPrice => selectors::TOTAL_SHIPPING_PRICE,
            TotalTarget::Payable => selectors::TOTAL_PAYABLE,
        }
    }
}

impl CartTotals {
    pub fn value_for(&self, target: TotalTarget) -> Option<&str> {
        let value = match target {
            TotalTarget::PayableSummary | TotalTarget::ProceedButton | TotalTarget::Payable => {
                &self.payable
            }
            TotalTarget::ActualPrice => &self.actual_price,
            TotalTarget::DiscountPrice => &self.discount_price,
            TotalTarget::ShippingPrice => &self.shipping_price,
        };
        value.as_deref()
    }

    /// (target, text) pairs to write, in page order, skipping absent fields.
    pub fn assignments(&self) -> Vec<(TotalTarget, &str)> {
        TotalTarget::ALL
            .iter()
            .filter_map(|&target| self.value_for(target).map(|v| (target, v)))
            .collect()
    }
}

/// Parse the item counter the way `parseInt` does: optional leading
/// whitespace, optional sign, then digits. Anything after the digits is
/// ignored. Returns `None` when no digits lead the text.
pub fn parse_item_count(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
