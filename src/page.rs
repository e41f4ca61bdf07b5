//! In-memory page model.
//!
//! Implements the view-model traits by recording every operation and keeping
//! just enough element state to answer reads. The CLI prints the recording;
//! tests assert on it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use crate::domain::TotalTarget;
use crate::view::{selectors, AlertSink, CartView, Modal, ModalView};

/// One mutation applied to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOp {
    FadeOut { selector: String, millis: u128 },
    Remove { selector: String },
    SetText { selector: String, text: String },
    Append { selector: String, html: String },
    Hide { selector: String },
    Alert(String),
    Reload,
}

impl fmt::Display for PageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageOp::FadeOut { selector, millis } => write!(f, "fadeOut {} ({}ms)", selector, millis),
            PageOp::Remove { selector } => write!(f, "remove {}", selector),
            PageOp::SetText { selector, text } => write!(f, "text {} = {:?}", selector, text),
            PageOp::Append { selector, html } => {
                write!(f, "append {} <- {} bytes of html", selector, html.len())
            }
            PageOp::Hide { selector } => write!(f, "hide {}", selector),
            PageOp::Alert(message) => write!(f, "alert {:?}", message),
            PageOp::Reload => write!(f, "reload"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingPage {
    texts: HashMap<String, String>,
    items: Vec<String>,
    cart_container: bool,
    appended: Vec<String>,
    visible_modals: HashSet<Modal>,
    backdrop: bool,
    alerts: Vec<String>,
    reloads: usize,
    ops: Vec<PageOp>,
}

impl RecordingPage {
    /// A cart page listing `slugs`, with the counter showing `items_in_cart`.
    pub fn cart(slugs: &[&str], items_in_cart: &str) -> Self {
        let mut texts = HashMap::new();
        texts.insert(selectors::ITEMS_IN_CART.to_string(), items_in_cart.to_string());
        Self {
            texts,
            items: slugs.iter().map(|s| s.to_string()).collect(),
            cart_container: true,
            ..Self::default()
        }
    }

    /// An admin page with `modal` open over a backdrop, as after the
    /// confirm button was pressed.
    pub fn admin_with_spinner(modal: Modal) -> Self {
        Self {
            visible_modals: HashSet::from([modal]),
            backdrop: true,
            ..Self::default()
        }
    }

    pub fn text(&self, selector: &str) -> Option<&str> {
        self.texts.get(selector).map(String::as_str)
    }

    pub fn has_item(&self, slug: &str) -> bool {
        self.items.iter().any(|s| s == slug)
    }

    pub fn has_cart_container(&self) -> bool {
        self.cart_container
    }

    /// Fragments appended to the page container, in order.
    pub fn appended(&self) -> &[String] {
        &self.appended
    }

    pub fn is_modal_visible(&self, modal: Modal) -> bool {
        self.visible_modals.contains(&modal)
    }

    pub fn has_backdrop(&self) -> bool {
        self.backdrop
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn reload_count(&self) -> usize {
        self.reloads
    }

    pub fn was_reloaded(&self) -> bool {
        self.reloads > 0
    }

    pub fn ops(&self) -> &[PageOp] {
        &self.ops
    }
}

impl AlertSink for RecordingPage {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
        self.ops.push(PageOp::Alert(message.to_string()));
    }
}

impl CartView for RecordingPage {
    fn fade_out_item(&mut self, slug: &str, duration: Duration) {
        self.ops.push(PageOp::FadeOut {
            selector: selectors::cart_item(slug),
            millis: duration.as_millis(),
        });
    }

    fn remove_item(&mut self, slug: &str) {
        self.items.retain(|s| s != slug);
        self.ops.push(PageOp::Remove {
            selector: selectors::cart_item(slug),
        });
    }

    fn items_in_cart_text(&self) -> Option<String> {
        self.texts.get(selectors::ITEMS_IN_CART).cloned()
    }

    fn set_items_in_cart(&mut self, text: &str) {
        self.set_text(selectors::ITEMS_IN_CART, text);
    }

    fn set_total(&mut self, target: TotalTarget, text: &str) {
        self.set_text(target.selector(), text);
    }

    fn replace_cart_with(&mut self, fragment: &str) {
        self.cart_container = false;
        self.ops.push(PageOp::Remove {
            selector: selectors::CART_CONTAINER.to_string(),
        });
        self.appended.push(fragment.to_string());
        self.ops.push(PageOp::Append {
            selector: selectors::CONTAINER.to_string(),
            html: fragment.to_string(),
        });
    }
}

impl ModalView for RecordingPage {
    fn hide_modal(&mut self, modal: Modal) {
        self.visible_modals.remove(&modal);
        self.ops.push(PageOp::Hide {
            selector: modal.selector().to_string(),
        });
    }

    fn remove_backdrop(&mut self) {
        self.backdrop = false;
        self.ops.push(PageOp::Remove {
            selector: selectors::MODAL_BACKDROP.to_string(),
        });
    }

    fn reload(&mut self) {
        self.reloads += 1;
        self.ops.push(PageOp::Reload);
    }
}

impl RecordingPage {
    fn set_text(&mut self, selector: &str, text: &str) {
        self.texts.insert(selector.to_string(), text.to_string());
        self.ops.push(PageOp::SetText {
            selector: selector.to_string(),
            text: text.to_string(),
        });
    }
}
