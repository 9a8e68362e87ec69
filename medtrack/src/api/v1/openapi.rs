use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medtrack API",
        version = "1.0.0",
        description = "Medication courses, adherence reports and family notifications.",
    ),
    paths(
        handlers::health::health_check,
        handlers::users::sign_up,
        handlers::users::sign_in,
        handlers::users::connect,
        handlers::users::list_observers,
        handlers::users::list_primaries,
        handlers::users::observer_dashboard,
        handlers::courses::create_course,
        handlers::courses::list_records,
        handlers::courses::take_record,
        handlers::courses::delete_record,
        handlers::reports::compliance,
        handlers::reports::calendar,
        handlers::reports::summary,
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,
        handlers::notifications::get_settings,
        handlers::notifications::update_settings,
        handlers::drugs::search_drugs,
        handlers::drugs::create_scan,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Users & family
        dto::users::V1Role,
        dto::users::SignUpRequest,
        dto::users::SignInRequest,
        dto::users::UserResponse,
        dto::users::ConnectRequest,
        dto::users::ConnectResponse,
        dto::users::LinkedAccountResponse,
        dto::users::TodayStatusResponse,
        // Courses & records
        dto::courses::CreateCourseRequest,
        dto::courses::CourseCreatedResponse,
        dto::courses::RecordResponse,
        dto::courses::TakeRecordResponse,
        // Reports
        dto::reports::ComplianceResponse,
        dto::reports::CalendarResponse,
        dto::reports::SummaryResponse,
        // Notifications
        dto::notifications::NotificationResponse,
        dto::notifications::MarkAllReadResponse,
        dto::notifications::NotificationSettingsResponse,
        dto::notifications::UpdateNotificationSettingsRequest,
        // Drugs & scans
        dto::drugs::DrugInfoResponse,
        dto::drugs::ScanResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::LlmStatus,
        handlers::health::ComponentStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "users", description = "Account sign-up and sign-in"),
        (name = "family", description = "Primary/observer links and dashboards"),
        (name = "courses", description = "Starting medication courses"),
        (name = "records", description = "Dose-day records"),
        (name = "reports", description = "Compliance, calendar and summaries"),
        (name = "notifications", description = "Inbox and push preferences"),
        (name = "drugs", description = "Drug information lookup"),
        (name = "scans", description = "Prescription-bag extraction"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
