//! View-model seams between the controllers and the page.
//!
//! Controllers never touch markup. They call named update operations on these
//! traits; a browser binding maps them onto the DOM, and [`crate::page`]
//! records them in memory.

use std::time::Duration;

use crate::domain::TotalTarget;

/// Element selectors the storefront templates expose.
pub mod selectors {
    pub const ITEMS_IN_CART: &str = "#items-in-cart";
    pub const TOTAL_PAYABLE_CLASS: &str = ".total-payable";
    pub const PROCEED_TO_PAY_SPAN: &str = "#proceed-to-pay-btn span";
    pub const TOTAL_ACTUAL_PRICE: &str = "#total-actual-price";
    pub const TOTAL_DISCOUNT_PRICE: &str = "#total-discount-price";
    pub const TOTAL_SHIPPING_PRICE: &str = "#total-shipping-price";
    pub const TOTAL_PAYABLE: &str = "#total-payable";
    pub const SPINNER_MODAL: &str = "#spinnerModal";
    pub const SPINNER_RESTORE_MODAL: &str = "#spinnerRestoreModal";
    pub const MODAL_BACKDROP: &str = ".modal-backdrop";
    pub const CART_CONTAINER: &str = ".cart-container";
    pub const CONTAINER: &str = ".container";

    /// Selector of a cart row, keyed by item slug.
    pub fn cart_item(slug: &str) -> String {
        format!("#{}", slug)
    }
}

/// Spinner modals shown while a storage operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    Backup,
    Restore,
}

impl Modal {
    pub fn selector(&self) -> &'static str {
        match self {
            Modal::Backup => selectors::SPINNER_MODAL,
            Modal::Restore => selectors::SPINNER_RESTORE_MODAL,
        }
    }
}

/// Blocking user-visible message.
pub trait AlertSink {
    fn alert(&mut self, message: &str);
}

/// Cart page operations.
pub trait CartView: AlertSink {
    /// Start fading out the row for `slug`.
    fn fade_out_item(&mut self, slug: &str, duration: Duration);

    /// Remove the row for `slug`.
    fn remove_item(&mut self, slug: &str);

    /// Current text of the item counter, if the counter is on the page.
    fn items_in_cart_text(&self) -> Option<String>;

    fn set_items_in_cart(&mut self, text: &str);

    fn set_total(&mut self, target: TotalTarget, text: &str);

    /// Drop the cart container and append `fragment` to the page container.
    fn replace_cart_with(&mut self, fragment: &str);
}

/// Admin page operations around backup/restore.
pub trait ModalView: AlertSink {
    fn hide_modal(&mut self, modal: Modal);

    fn remove_backdrop(&mut self);

    /// Reload the page, discarding all client state.
    fn reload(&mut self);
}
