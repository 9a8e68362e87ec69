use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

/// Multipart framing on top of the largest accepted image.
const SCAN_BODY_LIMIT: usize = handlers::drugs::MAX_IMAGE_SIZE + 64 * 1024;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let users = Router::new()
        .route("/{userId}/observers", get(handlers::users::list_observers))
        .route("/{userId}/primaries", get(handlers::users::list_primaries))
        .route("/{userId}/dashboard", get(handlers::users::observer_dashboard))
        .route(
            "/{userId}/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/{userId}/notifications:readAll",
            post(handlers::notifications::mark_all_read),
        )
        .route(
            "/{userId}/notification-settings",
            get(handlers::notifications::get_settings)
                .put(handlers::notifications::update_settings),
        );

    let records = Router::new()
        .route("/", get(handlers::courses::list_records))
        .route(
            "/{recordId}",
            axum::routing::delete(handlers::courses::delete_record),
        )
        .route("/{recordId}/take", post(handlers::courses::take_record));

    let scans = Router::new()
        .route("/", post(handlers::drugs::create_scan))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(SCAN_BODY_LIMIT));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .route("/users:signup", post(handlers::users::sign_up))
        .route("/users:signin", post(handlers::users::sign_in))
        .route("/family:connect", post(handlers::users::connect))
        .route("/courses", post(handlers::courses::create_course))
        .route("/compliance", get(handlers::reports::compliance))
        .route("/calendar", get(handlers::reports::calendar))
        .route("/summary", get(handlers::reports::summary))
        .route(
            "/notifications/{notificationId}/read",
            post(handlers::notifications::mark_read),
        )
        .route("/drugs/search", get(handlers::drugs::search_drugs))
        .nest("/users", users)
        .nest("/records", records)
        .nest("/scans", scans)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
