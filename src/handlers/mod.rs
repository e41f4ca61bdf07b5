//! Page controllers: one per user action.

pub mod cart;
pub mod storage;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use cart::{CartEmptyTemplate, CartItemRemover, RemovalOutcome, ITEM_SLUG_FIELD};
pub use storage::{ActionOutcome, BackupRestoreController};

/// Lock the shared view. A panic in another holder leaves the page in
/// whatever state it reached, which is still the page to draw on.
pub(crate) fn lock_view<V>(view: &Mutex<V>) -> MutexGuard<'_, V> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}
