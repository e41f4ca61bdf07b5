pub mod cli;
pub mod config;
pub mod csrf;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod page;
pub mod submit;
pub mod transport;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Result, StorefrontError};
