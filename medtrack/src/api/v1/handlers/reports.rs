//! v1 adherence report handlers.

use axum::extract::State;
use chrono::Local;

use crate::api::extractors::AppQuery;
use crate::api::v1::dto::{
    CalendarQuery, CalendarResponse, ComplianceQuery, ComplianceResponse, SummaryQuery,
    SummaryResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `GET /api/v1/compliance`
#[utoipa::path(
    get,
    path = "/api/v1/compliance",
    tag = "reports",
    operation_id = "reports.compliance",
    params(ComplianceQuery),
    responses(
        (status = 200, description = "Taken vs. total in the window", body = ComplianceResponse),
        (status = 400, description = "Window end before start", body = ApiError),
        (status = 503, description = "Record store unavailable", body = ApiError),
    )
)]
pub async fn compliance(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ComplianceQuery>,
) -> ApiResponse<ComplianceResponse> {
    match state
        .adherence
        .compute_compliance(&query.patient, query.from, query.to)
        .await
    {
        Ok(report) => ApiResponse::success(report.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/calendar`
#[utoipa::path(
    get,
    path = "/api/v1/calendar",
    tag = "reports",
    operation_id = "reports.calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Days of the month with records", body = CalendarResponse),
        (status = 400, description = "Invalid month", body = ApiError),
        (status = 503, description = "Record store unavailable", body = ApiError),
    )
)]
pub async fn calendar(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CalendarQuery>,
) -> ApiResponse<CalendarResponse> {
    match state
        .adherence
        .calendar_days(&query.patient, query.year, query.month)
        .await
    {
        Ok(days) => ApiResponse::success(CalendarResponse {
            year: query.year,
            month: query.month,
            days: days.into_iter().collect(),
        }),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/summary`
#[utoipa::path(
    get,
    path = "/api/v1/summary",
    tag = "reports",
    operation_id = "reports.summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Record counts", body = SummaryResponse),
        (status = 503, description = "Record store unavailable", body = ApiError),
    )
)]
pub async fn summary(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SummaryQuery>,
) -> ApiResponse<SummaryResponse> {
    let today = Local::now().date_naive();
    match state.adherence.summary(&query.patient, today).await {
        Ok(summary) => ApiResponse::success(summary.into()),
        Err(e) => e.into(),
    }
}
