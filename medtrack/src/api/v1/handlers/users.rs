//! v1 account and family-link handlers.

use axum::extract::{Path, State};
use chrono::Local;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{
    ConnectRequest, ConnectResponse, LinkedAccountResponse, SignInRequest, SignUpRequest,
    TodayStatusResponse, UserResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::services::SignUp;

/// `POST /api/v1/users:signup`
#[utoipa::path(
    post,
    path = "/api/v1/users:signup",
    tag = "users",
    operation_id = "users.signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid name or PIN", body = ApiError),
        (status = 409, description = "Name already taken", body = ApiError),
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignUpRequest>,
) -> ApiResponse<UserResponse> {
    let request = SignUp {
        name: req.name,
        age: req.age,
        role: req.role.into(),
        pin: req.pin,
    };

    match state.family.sign_up(request).await {
        Ok(user) => ApiResponse::created(user.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/users:signin`
#[utoipa::path(
    post,
    path = "/api/v1/users:signin",
    tag = "users",
    operation_id = "users.signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = UserResponse),
        (status = 401, description = "Invalid name or PIN", body = ApiError),
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignInRequest>,
) -> ApiResponse<UserResponse> {
    match state.family.sign_in(&req.name, &req.pin).await {
        Ok(user) => ApiResponse::success(user.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/family:connect`
#[utoipa::path(
    post,
    path = "/api/v1/family:connect",
    tag = "family",
    operation_id = "family.connect",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Link created or already present", body = ConnectResponse),
        (status = 400, description = "Wrong account roles", body = ApiError),
        (status = 401, description = "Invalid observer credentials", body = ApiError),
        (status = 404, description = "Primary account not found", body = ApiError),
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    AppJson(req): AppJson<ConnectRequest>,
) -> ApiResponse<ConnectResponse> {
    match state
        .family
        .connect(&req.primary_user_id, &req.observer_name, &req.observer_pin)
        .await
    {
        Ok(link) => ApiResponse::success(ConnectResponse {
            linked: link.is_some(),
            link_id: link.map(|l| l.id),
        }),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/users/{userId}/observers`
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/observers",
    tag = "family",
    operation_id = "family.observers",
    params(("userId" = String, Path, description = "Primary account ID")),
    responses(
        (status = 200, description = "Linked observers", body = Vec<LinkedAccountResponse>),
    )
)]
pub async fn list_observers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<Vec<LinkedAccountResponse>> {
    match state.family.linked_observers(&user_id).await {
        Ok(accounts) => ApiResponse::success(accounts.into_iter().map(Into::into).collect()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/users/{userId}/primaries`
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/primaries",
    tag = "family",
    operation_id = "family.primaries",
    params(("userId" = String, Path, description = "Observer account ID")),
    responses(
        (status = 200, description = "Followed primary accounts", body = Vec<LinkedAccountResponse>),
    )
)]
pub async fn list_primaries(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<Vec<LinkedAccountResponse>> {
    match state.family.linked_primaries(&user_id).await {
        Ok(accounts) => ApiResponse::success(accounts.into_iter().map(Into::into).collect()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/users/{userId}/dashboard`
///
/// Today's dose-days for every account the observer follows.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/dashboard",
    tag = "family",
    operation_id = "family.dashboard",
    params(("userId" = String, Path, description = "Observer account ID")),
    responses(
        (status = 200, description = "Today's status per followed account", body = Vec<TodayStatusResponse>),
        (status = 503, description = "Record store unavailable", body = ApiError),
    )
)]
pub async fn observer_dashboard(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<Vec<TodayStatusResponse>> {
    let today = Local::now().date_naive();
    match state.family.observer_dashboard(&user_id, today).await {
        Ok(statuses) => ApiResponse::success(statuses.into_iter().map(Into::into).collect()),
        Err(e) => e.into(),
    }
}
