//! v1 drug-information and prescription-scan handlers.

use axum::extract::{Multipart, State};

use crate::api::extractors::AppQuery;
use crate::api::v1::dto::{DrugInfoResponse, DrugSearchQuery, ScanResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

pub(crate) const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// `GET /api/v1/drugs/search`
///
/// Registry first, then the configured model as a fallback.
#[utoipa::path(
    get,
    path = "/api/v1/drugs/search",
    tag = "drugs",
    operation_id = "drugs.search",
    params(DrugSearchQuery),
    responses(
        (status = 200, description = "Matching drugs, possibly empty", body = Vec<DrugInfoResponse>),
        (status = 400, description = "Empty name", body = ApiError),
        (status = 501, description = "No drug information source configured", body = ApiError),
    )
)]
pub async fn search_drugs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DrugSearchQuery>,
) -> ApiResponse<Vec<DrugInfoResponse>> {
    if query.name.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Drug name cannot be empty");
    }
    if !state.drugs.is_available() {
        return ApiResponse::error(
            ErrorCode::NotImplemented,
            "No drug information source is configured",
        );
    }

    let drugs = state.drugs.search(&query.name).await;
    let total = drugs.len();
    ApiResponse::success_with_total(drugs.into_iter().map(Into::into).collect(), total)
}

/// `POST /api/v1/scans`
///
/// Multipart upload with one `image` field holding a photo of a prescription
/// bag. Returns the drugs, facility and date read from it.
#[utoipa::path(
    post,
    path = "/api/v1/scans",
    tag = "scans",
    operation_id = "scans.create",
    request_body(content_type = "multipart/form-data", description = "Field `image`: JPEG, PNG, WebP or GIF"),
    responses(
        (status = 200, description = "Extraction result", body = ScanResponse),
        (status = 400, description = "Missing or invalid image", body = ApiError),
        (status = 501, description = "No vision model configured", body = ApiError),
    )
)]
pub async fn create_scan(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResponse<ScanResponse> {
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = match field.bytes().await {
            Ok(b) => b,
            Err(e) => {
                return ApiResponse::error(
                    ErrorCode::InvalidRequest,
                    format!("Failed to read image: {e}"),
                );
            }
        };
        if bytes.len() > MAX_IMAGE_SIZE {
            return ApiResponse::error(
                ErrorCode::InvalidRequest,
                format!(
                    "Image too large: {} bytes (max {} bytes)",
                    bytes.len(),
                    MAX_IMAGE_SIZE
                ),
            );
        }
        image = Some((bytes.to_vec(), content_type));
    }

    let Some((bytes, content_type)) = image else {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Missing `image` field");
    };

    match state.scans.analyze(&bytes, &content_type).await {
        Ok(analysis) => ApiResponse::success(analysis.into()),
        Err(e) => e.into(),
    }
}
