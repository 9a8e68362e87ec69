//! v1 inbox and push-preference handlers.

use axum::extract::{Path, State};

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::v1::dto::{
    ListNotificationsQuery, MarkAllReadResponse, NotificationResponse,
    NotificationSettingsResponse, UpdateNotificationSettingsRequest,
};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

const DEFAULT_INBOX_LIMIT: u32 = 50;

/// `GET /api/v1/users/{userId}/notifications`
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/notifications",
    tag = "notifications",
    operation_id = "notifications.list",
    params(("userId" = String, Path, description = "Recipient account ID"), ListNotificationsQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = Vec<NotificationResponse>),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    AppQuery(query): AppQuery<ListNotificationsQuery>,
) -> ApiResponse<Vec<NotificationResponse>> {
    let notifications = if query.unread {
        state.notifier.unread(&user_id).await
    } else {
        state
            .notifier
            .recent(&user_id, query.limit.unwrap_or(DEFAULT_INBOX_LIMIT))
            .await
    };

    match notifications {
        Ok(items) => {
            let total = items.len();
            ApiResponse::success_with_total(items.into_iter().map(Into::into).collect(), total)
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/notifications/{notificationId}/read`
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{notificationId}/read",
    tag = "notifications",
    operation_id = "notifications.read",
    params(("notificationId" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Notification not found", body = ApiError),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> ApiResponse<serde_json::Value> {
    match state.notifier.mark_read(&notification_id).await {
        Ok(()) => ApiResponse::success(serde_json::json!({ "id": notification_id })),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/users/{userId}/notifications:readAll`
#[utoipa::path(
    post,
    path = "/api/v1/users/{userId}/notifications:readAll",
    tag = "notifications",
    operation_id = "notifications.readAll",
    params(("userId" = String, Path, description = "Recipient account ID")),
    responses(
        (status = 200, description = "Unread notifications marked read", body = MarkAllReadResponse),
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<MarkAllReadResponse> {
    match state.notifier.mark_all_read(&user_id).await {
        Ok(updated) => ApiResponse::success(MarkAllReadResponse { updated }),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/users/{userId}/notification-settings`
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/notification-settings",
    tag = "notifications",
    operation_id = "notifications.getSettings",
    params(("userId" = String, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Push preferences", body = NotificationSettingsResponse),
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<NotificationSettingsResponse> {
    match state.notifier.settings(&user_id).await {
        Ok(settings) => ApiResponse::success(NotificationSettingsResponse::new(
            settings,
            state.notifier.push_enabled(),
            None,
        )),
        Err(e) => e.into(),
    }
}

/// `PUT /api/v1/users/{userId}/notification-settings`
#[utoipa::path(
    put,
    path = "/api/v1/users/{userId}/notification-settings",
    tag = "notifications",
    operation_id = "notifications.updateSettings",
    params(("userId" = String, Path, description = "Account ID")),
    request_body = UpdateNotificationSettingsRequest,
    responses(
        (status = 200, description = "Preferences saved", body = NotificationSettingsResponse),
        (status = 400, description = "Invalid chat id", body = ApiError),
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    AppJson(req): AppJson<UpdateNotificationSettingsRequest>,
) -> ApiResponse<NotificationSettingsResponse> {
    match state
        .notifier
        .save_settings(&user_id, req.telegram_chat_id, req.telegram_enabled, req.send_test)
        .await
    {
        Ok((settings, test)) => ApiResponse::success(NotificationSettingsResponse::new(
            Some(settings),
            state.notifier.push_enabled(),
            test,
        )),
        Err(e) => e.into(),
    }
}
