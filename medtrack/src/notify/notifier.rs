use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use super::MessageTransport;
use crate::db::{NotificationSettingsStore, NotificationStore};
use crate::error::{MedtrackError, Result};
use crate::models::{is_valid_chat_id, Notification, NotificationCategory, NotificationSettings};

const TEST_MESSAGE: &str = "Notifications are connected. Medication updates will arrive here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Push disabled globally, or the recipient has not opted in.
    Skipped,
    Delivered,
    Failed,
}

impl DeliveryOutcome {
    pub fn attempted(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotifyOutcome {
    pub notification: Option<Notification>,
    pub delivery: DeliveryOutcome,
}

impl NotifyOutcome {
    pub fn written(&self) -> bool {
        self.notification.is_some()
    }
}

/// Writes inbox rows and, where enabled, pushes the same text.
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn NotificationStore>,
    settings: Arc<dyn NotificationSettingsStore>,
    transport: Option<Arc<dyn MessageTransport>>,
}

impl Notifier {
    /// `transport` is `None` when push delivery is switched off globally.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        settings: Arc<dyn NotificationSettingsStore>,
        transport: Option<Arc<dyn MessageTransport>>,
    ) -> Self {
        Self {
            store,
            settings,
            transport,
        }
    }

    pub fn push_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Never fails. Each step is attempted and its failure logged.
    pub async fn notify(
        &self,
        recipient_user_id: &str,
        message: &str,
        category: NotificationCategory,
    ) -> NotifyOutcome {
        let notification = match self
            .store
            .insert_notification(recipient_user_id, message, category)
            .await
        {
            Ok(notification) => Some(notification),
            Err(e) => {
                warn!(
                    recipient = recipient_user_id,
                    error = %e,
                    "Failed to write notification"
                );
                None
            }
        };

        let delivery = self.push(recipient_user_id, message).await;

        NotifyOutcome {
            notification,
            delivery,
        }
    }

    async fn push(&self, recipient_user_id: &str, message: &str) -> DeliveryOutcome {
        let Some(transport) = &self.transport else {
            return DeliveryOutcome::Skipped;
        };

        let settings = match self.settings.get_settings(recipient_user_id).await {
            Ok(Some(settings)) => settings,
            Ok(None) => return DeliveryOutcome::Skipped,
            Err(e) => {
                warn!(
                    recipient = recipient_user_id,
                    error = %e,
                    "Failed to load notification settings"
                );
                return DeliveryOutcome::Skipped;
            }
        };

        let Some(chat_id) = settings.push_target() else {
            return DeliveryOutcome::Skipped;
        };

        match transport.send(chat_id, message).await {
            Ok(()) => {
                debug!(recipient = recipient_user_id, "Push notification delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                warn!(
                    recipient = recipient_user_id,
                    error = %e,
                    "Push notification failed"
                );
                DeliveryOutcome::Failed
            }
        }
    }

    pub async fn unread(&self, user_id: &str) -> Result<Vec<Notification>> {
        self.store.unread_notifications(user_id).await
    }

    pub async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<Notification>> {
        self.store.recent_notifications(user_id, limit.clamp(1, 100)).await
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        if self.store.mark_notification_read(notification_id).await? {
            Ok(())
        } else {
            Err(MedtrackError::NotFound(format!(
                "Notification {notification_id} not found"
            )))
        }
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        self.store.mark_all_notifications_read(user_id).await
    }

    pub async fn settings(&self, user_id: &str) -> Result<Option<NotificationSettings>> {
        self.settings.get_settings(user_id).await
    }

    /// Stores push preferences. With `send_test`, a confirmation is pushed
    /// immediately and its outcome returned.
    pub async fn save_settings(
        &self,
        user_id: &str,
        chat_id: Option<String>,
        enabled: bool,
        send_test: bool,
    ) -> Result<(NotificationSettings, Option<DeliveryOutcome>)> {
        let chat_id = chat_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        if let Some(ref id) = chat_id {
            if !is_valid_chat_id(id) {
                return Err(MedtrackError::Validation(format!(
                    "Chat id must be numeric, got '{id}'"
                )));
            }
        }
        if enabled && chat_id.is_none() {
            return Err(MedtrackError::Validation(
                "A chat id is required to enable push notifications".to_string(),
            ));
        }

        let settings = NotificationSettings {
            user_id: user_id.to_string(),
            telegram_chat_id: chat_id,
            telegram_enabled: enabled,
            updated_at: Utc::now(),
        };
        self.settings.upsert_settings(&settings).await?;

        let test = if send_test {
            Some(self.push(user_id, TEST_MESSAGE).await)
        } else {
            None
        };

        Ok((settings, test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_backend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTransport {
        sent: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl MessageTransport for CountingTransport {
        async fn send(&self, _chat_id: &str, _message: &str) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(MedtrackError::Notification("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_row_written_without_push() {
        let (backend, _tmp) = temp_backend().await;
        let notifier = Notifier::new(backend.clone(), backend.clone(), None);

        let outcome = notifier
            .notify("u1", "hello", NotificationCategory::Medication)
            .await;

        assert!(outcome.written());
        assert_eq!(outcome.delivery, DeliveryOutcome::Skipped);
        assert_eq!(notifier.unread("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_push_only_for_opted_in_recipient() {
        let (backend, _tmp) = temp_backend().await;
        let transport = Arc::new(CountingTransport::default());
        let notifier = Notifier::new(backend.clone(), backend.clone(), Some(transport.clone()));

        notifier
            .save_settings("u1", Some("123".to_string()), true, false)
            .await
            .unwrap();

        let opted_in = notifier.notify("u1", "hi", NotificationCategory::Medication).await;
        let silent = notifier.notify("u2", "hi", NotificationCategory::Medication).await;

        assert_eq!(opted_in.delivery, DeliveryOutcome::Delivered);
        assert_eq!(silent.delivery, DeliveryOutcome::Skipped);
        assert_eq!(transport.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_push_failure_is_swallowed() {
        let (backend, _tmp) = temp_backend().await;
        let transport = Arc::new(CountingTransport {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::new(backend.clone(), backend.clone(), Some(transport));
        notifier
            .save_settings("u1", Some("-100".to_string()), true, false)
            .await
            .unwrap();

        let outcome = notifier.notify("u1", "hi", NotificationCategory::Medication).await;

        assert!(outcome.written());
        assert_eq!(outcome.delivery, DeliveryOutcome::Failed);
    }

    #[tokio::test]
    async fn test_save_settings_validates_chat_id() {
        let (backend, _tmp) = temp_backend().await;
        let notifier = Notifier::new(backend.clone(), backend.clone(), None);

        let err = notifier
            .save_settings("u1", Some("abc".to_string()), true, false)
            .await
            .unwrap_err();
        assert!(matches!(err, MedtrackError::Validation(_)));

        let err = notifier.save_settings("u1", None, true, false).await.unwrap_err();
        assert!(matches!(err, MedtrackError::Validation(_)));

        let (_, test) = notifier.save_settings("u1", None, false, true).await.unwrap();
        assert_eq!(test, Some(DeliveryOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_mark_read_unknown_is_not_found() {
        let (backend, _tmp) = temp_backend().await;
        let notifier = Notifier::new(backend.clone(), backend.clone(), None);
        let err = notifier.mark_read("missing").await.unwrap_err();
        assert!(matches!(err, MedtrackError::NotFound(_)));
    }
}
