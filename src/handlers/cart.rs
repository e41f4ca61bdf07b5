//! Removing an item from the cart and redrawing the totals.

use askama::Template;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::lock_view;
use crate::config::ClientConfig;
use crate::domain::{parse_item_count, CartTotals};
use crate::error::StorefrontError;
use crate::transport::{PostRequest, Transport, TransportError};
use crate::view::CartView;

/// Form field carrying the item slug
pub const ITEM_SLUG_FIELD: &str = "item-slug";

#[derive(Template)]
#[template(path = "cart_empty.html")]
pub struct CartEmptyTemplate<'a> {
    pub continue_shopping_url: &'a str,
}

/// What a removal did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Row removed and totals redrawn. `remaining` is `None` when the
    /// counter could not be read.
    Removed { remaining: Option<i64> },
    /// Last item removed; the cart was swapped for the empty-cart fragment.
    Emptied,
    /// Server answered without `success`. The page is left untouched.
    Rejected { error: Option<String> },
    /// Request failed; the error was alerted.
    Failed(TransportError),
}

pub struct CartItemRemover<T, V> {
    transport: T,
    view: Arc<Mutex<V>>,
    url: String,
    fade_out: Duration,
    empty_cart_html: String,
    emptied: AtomicBool,
}

impl<T: Transport, V: CartView> CartItemRemover<T, V> {
    pub fn new(
        config: &ClientConfig,
        transport: T,
        view: Arc<Mutex<V>>,
    ) -> Result<Self, StorefrontError> {
        let empty_cart_html = CartEmptyTemplate {
            continue_shopping_url: &config.continue_shopping_url,
        }
        .render()?;

        Ok(Self {
            transport,
            view,
            url: config.remove_from_cart_url(),
            fade_out: config.fade_out,
            empty_cart_html,
            emptied: AtomicBool::new(false),
        })
    }

    /// Ask the server to drop `item_slug` from the cart and mirror the
    /// result on the page.
    pub async fn remove(&self, item_slug: &str) -> RemovalOutcome {
        let request = PostRequest::new(&self.url).field(ITEM_SLUG_FIELD, item_slug);

        let envelope = match self.transport.post(request).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!("Removing {} from cart failed: {}", item_slug, err);
                lock_view(&self.view).alert(&err.alert_text());
                return RemovalOutcome::Failed(err);
            }
        };

        // TODO: surface `success:false` to the shopper once the server
        // distinguishes "already removed" from a real failure.
        if !envelope.is_success() {
            let error = envelope.error_message();
            tracing::warn!(
                "Server declined removal of {}: {}",
                item_slug,
                error.as_deref().unwrap_or("no reason given")
            );
            return RemovalOutcome::Rejected { error };
        }

        tracing::info!("item removed: {}", item_slug);

        lock_view(&self.view).fade_out_item(item_slug, self.fade_out);
        tokio::time::sleep(self.fade_out).await;

        let mut view = lock_view(&self.view);
        self.apply_removal(&mut *view, item_slug, &envelope.totals)
    }

    fn apply_removal(&self, view: &mut V, item_slug: &str, totals: &CartTotals) -> RemovalOutcome {
        view.remove_item(item_slug);

        let count = view
            .items_in_cart_text()
            .as_deref()
            .and_then(parse_item_count);

        let Some(count) = count else {
            tracing::warn!("Cart counter unreadable; leaving it as is");
            write_totals(view, totals);
            return RemovalOutcome::Removed { remaining: None };
        };

        let remaining = count - 1;
        view.set_items_in_cart(&remaining.to_string());

        if remaining <= 0 {
            if !self.emptied.swap(true, Ordering::AcqRel) {
                view.replace_cart_with(&self.empty_cart_html);
            }
            return RemovalOutcome::Emptied;
        }

        write_totals(view, totals);
        RemovalOutcome::Removed {
            remaining: Some(remaining),
        }
    }
}

fn write_totals<V: CartView>(view: &mut V, totals: &CartTotals) {
    for (target, text) in totals.assignments() {
        view.set_total(target, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResponseEnvelope, TotalTarget};
    use crate::page::{PageOp, RecordingPage};
    use crate::testing::ScriptedTransport;
    use crate::view::selectors;

    fn totals() -> CartTotals {
        CartTotals {
            payable: Some("90.00".into()),
            actual_price: Some("100.00".into()),
            discount_price: Some("15.00".into()),
            shipping_price: Some("5.00".into()),
        }
    }

    fn remover(
        transport: ScriptedTransport,
        page: RecordingPage,
    ) -> (
        CartItemRemover<Arc<ScriptedTransport>, RecordingPage>,
        Arc<ScriptedTransport>,
        Arc<Mutex<RecordingPage>>,
    ) {
        let transport = Arc::new(transport);
        let page = Arc::new(Mutex::new(page));
        let remover =
            CartItemRemover::new(&ClientConfig::default(), transport.clone(), page.clone())
                .unwrap();
        (remover, transport, page)
    }

    #[test]
    fn test_empty_cart_template_renders_link() {
        let html = CartEmptyTemplate {
            continue_shopping_url: "catalog",
        }
        .render()
        .unwrap();
        assert!(html.contains("Your cart is empty"));
        assert!(html.contains("href=\"catalog\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_removal_updates_counter_and_totals() {
        let transport =
            ScriptedTransport::new().reply(Ok(ResponseEnvelope::success().with_totals(totals())));
        let (remover, transport, page) =
            remover(transport, RecordingPage::cart(&["sku-42", "sku-7"], "2"));

        let outcome = remover.remove("sku-42").await;
        assert_eq!(outcome, RemovalOutcome::Removed { remaining: Some(1) });

        let page = page.lock().unwrap();
        assert!(!page.has_item("sku-42"));
        assert!(page.has_item("sku-7"));
        assert_eq!(page.text(selectors::ITEMS_IN_CART), Some("1"));
        for target in TotalTarget::ALL {
            assert_eq!(
                page.text(target.selector()),
                totals().value_for(target),
                "{:?}",
                target
            );
        }
        assert!(page.has_cart_container());
        assert!(page.alerts().is_empty());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://localhost:8000/cart/remove/");
        assert_eq!(
            requests[0].form,
            vec![("item-slug".to_string(), "sku-42".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_row_fades_before_removal() {
        let transport = ScriptedTransport::new().reply(Ok(ResponseEnvelope::success()));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["sku-42"], "3"));

        remover.remove("sku-42").await;

        let page = page.lock().unwrap();
        assert_eq!(
            page.ops()[0],
            PageOp::FadeOut {
                selector: "#sku-42".into(),
                millis: 300
            }
        );
        assert_eq!(
            page.ops()[1],
            PageOp::Remove {
                selector: "#sku-42".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_item_swaps_in_empty_cart() {
        let transport =
            ScriptedTransport::new().reply(Ok(ResponseEnvelope::success().with_totals(totals())));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["sku-42"], "1"));

        assert_eq!(remover.remove("sku-42").await, RemovalOutcome::Emptied);

        let page = page.lock().unwrap();
        assert!(!page.has_cart_container());
        assert_eq!(page.appended().len(), 1);
        assert!(page.appended()[0].contains("Your cart is empty"));
        assert_eq!(page.text(selectors::ITEMS_IN_CART), Some("0"));
        // Totals are not redrawn once the cart is gone
        assert_eq!(page.text(selectors::TOTAL_PAYABLE), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_cart_fragment_appended_once() {
        let transport = ScriptedTransport::new()
            .reply(Ok(ResponseEnvelope::success()))
            .reply(Ok(ResponseEnvelope::success()));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["a", "b"], "1"));

        assert_eq!(remover.remove("a").await, RemovalOutcome::Emptied);
        assert_eq!(remover.remove("b").await, RemovalOutcome::Emptied);

        assert_eq!(page.lock().unwrap().appended().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_removal_leaves_page_untouched() {
        let transport = ScriptedTransport::new().reply(Ok(ResponseEnvelope::default()));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["sku-42"], "2"));

        assert_eq!(
            remover.remove("sku-42").await,
            RemovalOutcome::Rejected { error: None }
        );

        let page = page.lock().unwrap();
        assert!(page.ops().is_empty());
        assert!(page.has_item("sku-42"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_removal_reports_server_error() {
        let transport =
            ScriptedTransport::new().reply(Ok(ResponseEnvelope::failure("Item not in cart")));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["sku-42"], "2"));

        assert_eq!(
            remover.remove("sku-42").await,
            RemovalOutcome::Rejected {
                error: Some("Item not in cart".into())
            }
        );
        assert!(page.lock().unwrap().alerts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_alerts() {
        let err = TransportError::Status {
            status: 500,
            body: "boom".into(),
        };
        let transport = ScriptedTransport::new().reply(Err(err.clone()));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["sku-42"], "2"));

        assert_eq!(remover.remove("sku-42").await, RemovalOutcome::Failed(err));

        let page = page.lock().unwrap();
        assert_eq!(page.alerts(), ["Request failed (HTTP 500): boom".to_string()]);
        assert!(page.has_item("sku-42"));
        assert_eq!(page.text(selectors::ITEMS_IN_CART), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_counter_still_redraws_totals() {
        let transport =
            ScriptedTransport::new().reply(Ok(ResponseEnvelope::success().with_totals(totals())));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["sku-42"], "many"));

        assert_eq!(
            remover.remove("sku-42").await,
            RemovalOutcome::Removed { remaining: None }
        );

        let page = page.lock().unwrap();
        assert_eq!(page.text(selectors::ITEMS_IN_CART), Some("many"));
        assert_eq!(page.text(selectors::TOTAL_PAYABLE), Some("90.00"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_totals_keep_previous_text() {
        let partial = CartTotals {
            payable: Some("40.00".into()),
            ..CartTotals::default()
        };
        let transport =
            ScriptedTransport::new().reply(Ok(ResponseEnvelope::success().with_totals(partial)));
        let (remover, _, page) = remover(transport, RecordingPage::cart(&["sku-42"], "3"));

        remover.remove("sku-42").await;

        let page = page.lock().unwrap();
        assert_eq!(page.text(selectors::TOTAL_PAYABLE), Some("40.00"));
        assert_eq!(page.text(selectors::TOTAL_SHIPPING_PRICE), None);
    }
}
