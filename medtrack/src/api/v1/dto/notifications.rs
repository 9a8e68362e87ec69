//! Inbox and push-preference DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models;
use crate::notify::DeliveryOutcome;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub message: String,
    /// `medication`, `reminder` or `system`.
    pub category: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<models::Notification> for NotificationResponse {
    fn from(n: models::Notification) -> Self {
        Self {
            id: n.id,
            message: n.message,
            category: n.category.to_string(),
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// Query for `GET /v1/users/{userId}/notifications`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    /// Only unread notifications. Defaults to `false`.
    #[serde(default)]
    pub unread: bool,
    /// Clamped to `1..=100`, defaults to 50. Ignored with `unread=true`.
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
    pub telegram_enabled: bool,
    /// Whether the server can push at all.
    pub push_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Outcome of the confirmation push, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_delivery: Option<String>,
}

impl NotificationSettingsResponse {
    pub fn new(
        settings: Option<models::NotificationSettings>,
        push_available: bool,
        test_delivery: Option<DeliveryOutcome>,
    ) -> Self {
        let (telegram_chat_id, telegram_enabled, updated_at) = match settings {
            Some(s) => (s.telegram_chat_id, s.telegram_enabled, Some(s.updated_at)),
            None => (None, false, None),
        };
        Self {
            telegram_chat_id,
            telegram_enabled,
            push_available,
            updated_at,
            test_delivery: test_delivery.map(|outcome| outcome.to_string()),
        }
    }
}

/// Request body for `PUT /v1/users/{userId}/notification-settings`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationSettingsRequest {
    pub telegram_chat_id: Option<String>,
    pub telegram_enabled: bool,
    /// Push a confirmation message right away.
    #[serde(default)]
    pub send_test: bool,
}
