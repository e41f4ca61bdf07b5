//! Backup to and restore from cloud storage.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::lock_view;
use crate::config::ClientConfig;
use crate::domain::ResponseEnvelope;
use crate::submit::SubmitGuard;
use crate::transport::{PostRequest, Transport, TransportError};
use crate::view::{Modal, ModalView};

/// Result of one backup or restore trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed { message: Option<String> },
    /// The server reported an application error, which was alerted.
    Failed { error: String },
    /// The request itself failed, which was alerted.
    TransportFailed(TransportError),
    /// Response had neither `success` nor `error`; nothing changed.
    Ignored,
    /// A previous trigger is still in flight; no request was sent.
    AlreadyRunning,
    /// Cancelled before the response arrived; nothing changed.
    Cancelled,
}

pub struct BackupRestoreController<T, V> {
    transport: T,
    view: Arc<Mutex<V>>,
    backup_url: String,
    restore_url: String,
    error_alert_delay: Duration,
    backup_guard: SubmitGuard,
    restore_guard: SubmitGuard,
}

impl<T: Transport, V: ModalView> BackupRestoreController<T, V> {
    pub fn new(config: &ClientConfig, transport: T, view: Arc<Mutex<V>>) -> Self {
        Self {
            transport,
            view,
            backup_url: config.backup_url(),
            restore_url: config.restore_url(),
            error_alert_delay: config.backup_error_alert_delay,
            backup_guard: SubmitGuard::new(),
            restore_guard: SubmitGuard::new(),
        }
    }

    /// Back up to storage.
    ///
    /// On success the spinner and backdrop go away. An application error
    /// also clears them, then is alerted after the configured delay.
    pub async fn backup(&self) -> ActionOutcome {
        let Some(mut submission) = self.backup_guard.try_begin() else {
            tracing::info!("Backup already in progress; ignoring trigger");
            return ActionOutcome::AlreadyRunning;
        };

        let request = PostRequest::new(&self.backup_url);
        let Some(reply) = submission.run(self.transport.post(request)).await else {
            tracing::info!("Backup cancelled");
            return ActionOutcome::Cancelled;
        };

        let envelope = match reply {
            Ok(envelope) => envelope,
            Err(err) => return self.transport_failed(Modal::Backup, err),
        };

        if envelope.is_success() {
            tracing::info!(
                "Backup finished: {}",
                envelope.success_message().unwrap_or("ok")
            );
            let mut view = lock_view(&self.view);
            view.hide_modal(Modal::Backup);
            view.remove_backdrop();
        }

        let Some(error) = envelope.error_message() else {
            return completed_or_ignored(&envelope);
        };

        tracing::warn!("Backup failed: {}", error);
        {
            let mut view = lock_view(&self.view);
            view.hide_modal(Modal::Backup);
            view.remove_backdrop();
        }
        // The user may trigger again while the alert is pending
        drop(submission);

        tokio::time::sleep(self.error_alert_delay).await;
        lock_view(&self.view).alert(&error);
        ActionOutcome::Failed { error }
    }

    /// Restore from storage.
    ///
    /// On success the page reloads. An application error clears the spinner
    /// and backdrop and is alerted immediately.
    pub async fn restore(&self) -> ActionOutcome {
        let Some(mut submission) = self.restore_guard.try_begin() else {
            tracing::info!("Restore already in progress; ignoring trigger");
            return ActionOutcome::AlreadyRunning;
        };

        let request = PostRequest::new(&self.restore_url);
        let Some(reply) = submission.run(self.transport.post(request)).await else {
            tracing::info!("Restore cancelled");
            return ActionOutcome::Cancelled;
        };

        let envelope = match reply {
            Ok(envelope) => envelope,
            Err(err) => return self.transport_failed(Modal::Restore, err),
        };

        let mut view = lock_view(&self.view);

        if envelope.is_success() {
            tracing::info!(
                "Restore finished: {}",
                envelope.success_message().unwrap_or("ok")
            );
            view.hide_modal(Modal::Restore);
            view.reload();
        }

        let Some(error) = envelope.error_message() else {
            return completed_or_ignored(&envelope);
        };

        tracing::warn!("Restore failed: {}", error);
        view.hide_modal(Modal::Restore);
        view.remove_backdrop();
        view.alert(&error);
        ActionOutcome::Failed { error }
    }

    /// Cancel an outstanding backup. Returns whether one was running.
    pub fn cancel_backup(&self) -> bool {
        self.backup_guard.cancel()
    }

    /// Cancel an outstanding restore. Returns whether one was running.
    pub fn cancel_restore(&self) -> bool {
        self.restore_guard.cancel()
    }

    pub fn is_backup_running(&self) -> bool {
        self.backup_guard.is_busy()
    }

    pub fn is_restore_running(&self) -> bool {
        self.restore_guard.is_busy()
    }

    fn transport_failed(&self, modal: Modal, err: TransportError) -> ActionOutcome {
        tracing::warn!("{:?} request failed: {}", modal, err);
        let mut view = lock_view(&self.view);
        view.hide_modal(modal);
        view.remove_backdrop();
        view.alert(&err.alert_text());
        ActionOutcome::TransportFailed(err)
    }
}

fn completed_or_ignored(envelope: &ResponseEnvelope) -> ActionOutcome {
    if envelope.is_success() {
        ActionOutcome::Completed {
            message: envelope.success_message().map(str::to_string),
        }
    } else {
        ActionOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageOp, RecordingPage};
    use crate::testing::ScriptedTransport;

    type Controller = BackupRestoreController<Arc<ScriptedTransport>, RecordingPage>;

    fn controller(
        transport: ScriptedTransport,
        page: RecordingPage,
    ) -> (Arc<Controller>, Arc<ScriptedTransport>, Arc<Mutex<RecordingPage>>) {
        let transport = Arc::new(transport);
        let page = Arc::new(Mutex::new(page));
        let controller = Arc::new(BackupRestoreController::new(
            &ClientConfig::default(),
            transport.clone(),
            page.clone(),
        ));
        (controller, transport, page)
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_success_clears_spinner() {
        let transport = ScriptedTransport::new().reply(Ok(ResponseEnvelope::success_with_message(
            "Backup Completed successfully",
        )));
        let (ctl, transport, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Backup));

        assert_eq!(
            ctl.backup().await,
            ActionOutcome::Completed {
                message: Some("Backup Completed successfully".into())
            }
        );

        let page = page.lock().unwrap();
        assert!(!page.is_modal_visible(Modal::Backup));
        assert!(!page.has_backdrop());
        assert!(page.alerts().is_empty());
        assert!(!page.was_reloaded());
        assert_eq!(transport.requests()[0].url, "http://localhost:8000/backup-to-s3/");
        assert!(transport.requests()[0].form.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_error_alerts_once_after_delay() {
        let transport =
            ScriptedTransport::new().reply(Ok(ResponseEnvelope::failure("S3 unreachable")));
        let (ctl, _, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Backup));

        let started = tokio::time::Instant::now();
        let task = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.backup().await })
        };

        tokio::time::sleep(Duration::from_millis(1999)).await;
        {
            let page = page.lock().unwrap();
            assert!(!page.is_modal_visible(Modal::Backup));
            assert!(!page.has_backdrop());
            assert!(page.alerts().is_empty());
        }

        let outcome = task.await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                error: "S3 unreachable".into()
            }
        );
        assert_eq!(page.lock().unwrap().alerts(), ["S3 unreachable".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_success_reloads() {
        let transport = ScriptedTransport::new().reply(Ok(ResponseEnvelope::success()));
        let (ctl, transport, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Restore));

        assert_eq!(ctl.restore().await, ActionOutcome::Completed { message: None });

        let page = page.lock().unwrap();
        assert!(!page.is_modal_visible(Modal::Restore));
        assert_eq!(page.reload_count(), 1);
        // The backdrop goes away with the reload, not before it
        assert!(page.has_backdrop());
        assert_eq!(
            transport.requests()[0].url,
            "http://localhost:8000/restore-from-s3/"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_error_alerts_immediately() {
        let transport =
            ScriptedTransport::new().reply(Ok(ResponseEnvelope::failure("Nothing to restore")));
        let (ctl, _, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Restore));

        let started = tokio::time::Instant::now();
        let outcome = ctl.restore().await;
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                error: "Nothing to restore".into()
            }
        );

        let page = page.lock().unwrap();
        assert!(!page.is_modal_visible(Modal::Restore));
        assert!(!page.has_backdrop());
        assert!(!page.was_reloaded());
        assert_eq!(page.alerts(), ["Nothing to restore".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_clears_spinner_and_alerts() {
        let transport = ScriptedTransport::new().reply(Err(TransportError::Timeout));
        let (ctl, _, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Backup));

        assert_eq!(
            ctl.backup().await,
            ActionOutcome::TransportFailed(TransportError::Timeout)
        );

        let page = page.lock().unwrap();
        assert!(!page.is_modal_visible(Modal::Backup));
        assert!(!page.has_backdrop());
        assert_eq!(page.alerts(), ["Request timed out".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_response_is_ignored() {
        let transport = ScriptedTransport::new().reply(Ok(ResponseEnvelope::default()));
        let (ctl, _, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Restore));

        assert_eq!(ctl.restore().await, ActionOutcome::Ignored);
        assert!(page.lock().unwrap().ops().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_trigger_sends_one_request() {
        let transport = ScriptedTransport::new()
            .reply_after(Duration::from_secs(5), Ok(ResponseEnvelope::success()));
        let (ctl, transport, _) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Backup));

        let first = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.backup().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(ctl.is_backup_running());

        assert_eq!(ctl.backup().await, ActionOutcome::AlreadyRunning);
        assert_eq!(
            first.await.unwrap(),
            ActionOutcome::Completed { message: None }
        );
        assert_eq!(transport.requests().len(), 1);
        assert!(!ctl.is_backup_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_and_restore_guards_are_independent() {
        let transport = ScriptedTransport::new()
            .reply_after(Duration::from_secs(5), Ok(ResponseEnvelope::success()))
            .reply(Ok(ResponseEnvelope::failure("Nothing to restore")));
        let (ctl, transport, _) = controller(transport, RecordingPage::default());

        let backup = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.backup().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(
            ctl.restore().await,
            ActionOutcome::Failed {
                error: "Nothing to restore".into()
            }
        );
        assert!(matches!(
            backup.await.unwrap(),
            ActionOutcome::Completed { .. }
        ));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_restore_leaves_page_alone() {
        let transport = ScriptedTransport::new()
            .reply_after(Duration::from_secs(30), Ok(ResponseEnvelope::success()));
        let (ctl, _, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Restore));

        let task = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.restore().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(ctl.cancel_restore());
        assert_eq!(task.await.unwrap(), ActionOutcome::Cancelled);
        assert!(!ctl.is_restore_running());

        let page = page.lock().unwrap();
        assert!(page.ops().is_empty());
        assert!(!page.was_reloaded());
        assert!(!ctl.cancel_restore());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_and_error_run_both_branches() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"success": true, "error": "partial restore"}"#).unwrap();
        let transport = ScriptedTransport::new().reply(Ok(envelope));
        let (ctl, _, page) =
            controller(transport, RecordingPage::admin_with_spinner(Modal::Restore));

        ctl.restore().await;

        let page = page.lock().unwrap();
        assert_eq!(
            page.ops(),
            [
                PageOp::Hide {
                    selector: "#spinnerRestoreModal".into()
                },
                PageOp::Reload,
                PageOp::Hide {
                    selector: "#spinnerRestoreModal".into()
                },
                PageOp::Remove {
                    selector: ".modal-backdrop".into()
                },
                PageOp::Alert("partial restore".into()),
            ]
        );
    }
}
