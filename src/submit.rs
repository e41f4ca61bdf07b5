//! Single-flight guard with cancellation for user-triggered actions.
//!
//! A trigger while the previous request is still outstanding is refused
//! rather than issuing a duplicate. The outstanding request can be cancelled;
//! its response is then dropped unseen.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

#[derive(Debug)]
pub struct SubmitGuard {
    busy: AtomicBool,
    cancel_tx: watch::Sender<bool>,
}

impl Default for SubmitGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitGuard {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            busy: AtomicBool::new(false),
            cancel_tx,
        }
    }

    /// Claim the guard. `None` while another submission holds it.
    pub fn try_begin(&self) -> Option<Submission<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        self.cancel_tx.send_replace(false);
        Some(Submission {
            guard: self,
            cancel_rx: self.cancel_tx.subscribe(),
        })
    }

    /// Cancel the outstanding submission, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        if !self.is_busy() {
            return false;
        }
        self.cancel_tx.send_replace(true);
        true
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// A claimed guard. Releases it on drop.
#[derive(Debug)]
pub struct Submission<'a> {
    guard: &'a SubmitGuard,
    cancel_rx: watch::Receiver<bool>,
}

impl Submission<'_> {
    /// Drive `fut` to completion unless the guard is cancelled first.
    pub async fn run<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::select! {
            out = fut => Some(out),
            _ = cancelled(&mut self.cancel_rx) => None,
        }
    }
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone: nothing can cancel us any more
            std::future::pending::<()>().await;
        }
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}
