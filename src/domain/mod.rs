//! Request/response data shared by the controllers.

pub mod cart;
pub mod envelope;

pub use cart::{parse_item_count, CartTotals, TotalTarget};
pub use envelope::ResponseEnvelope;
