//! v1 course and dose-day record handlers.

use axum::extract::{Path, State};

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::v1::dto::{
    CourseCreatedResponse, CreateCourseRequest, ListRecordsQuery, RecordResponse,
    TakeRecordResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `POST /api/v1/courses`
///
/// Writes one dose-day per calendar day of the course. Copies that fail to
/// write are skipped; `createdDays` reports how many exist.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "courses",
    operation_id = "courses.create",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course started", body = CourseCreatedResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 500, description = "Course could not be started", body = ApiError),
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateCourseRequest>,
) -> ApiResponse<CourseCreatedResponse> {
    let course = match req.into_new_course() {
        Ok(course) => course,
        Err(e) => return e.into(),
    };

    match state.courses.start_course(course).await {
        Ok(created) => ApiResponse::created(created.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/records`
#[utoipa::path(
    get,
    path = "/api/v1/records",
    tag = "records",
    operation_id = "records.list",
    params(ListRecordsQuery),
    responses(
        (status = 200, description = "Dose-day records", body = Vec<RecordResponse>),
        (status = 503, description = "Record store unavailable", body = ApiError),
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListRecordsQuery>,
) -> ApiResponse<Vec<RecordResponse>> {
    let records = match query.date {
        Some(date) => state.adherence.records_on(&query.patient, date).await,
        None => state.adherence.history(&query.patient).await,
    };

    match records {
        Ok(records) => {
            let total = records.len();
            ApiResponse::success_with_total(records.into_iter().map(Into::into).collect(), total)
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/records/{recordId}/take`
///
/// Marks the dose-day taken and notifies the owner's observers. Notification
/// problems never fail the request.
#[utoipa::path(
    post,
    path = "/api/v1/records/{recordId}/take",
    tag = "records",
    operation_id = "records.take",
    params(("recordId" = String, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record marked taken", body = TakeRecordResponse),
        (status = 404, description = "Record not found", body = ApiError),
    )
)]
pub async fn take_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> ApiResponse<TakeRecordResponse> {
    let context = match state.completion.context_for(&record_id).await {
        Ok(context) => context,
        Err(e) => return e.into(),
    };

    match state.completion.mark_taken(context).await {
        Ok(report) => ApiResponse::success(report.into()),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/records/{recordId}`
#[utoipa::path(
    delete,
    path = "/api/v1/records/{recordId}",
    tag = "records",
    operation_id = "records.delete",
    params(("recordId" = String, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "Record not found", body = ApiError),
    )
)]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> ApiResponse<serde_json::Value> {
    match state.courses.delete_record(&record_id).await {
        Ok(()) => ApiResponse::success(serde_json::json!({ "id": record_id })),
        Err(e) => e.into(),
    }
}
