use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub llm: LlmStatus,
    /// Public drug registry lookups.
    pub drug_registry: ComponentStatus,
    /// Telegram push delivery. Inbox rows are written either way.
    pub push: ComponentStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: String,
    pub replica: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ComponentStatus {
    pub enabled: bool,
}

impl From<bool> for ComponentStatus {
    fn from(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let replica = state.config.database.is_replica();
    let database = match state.db.sync().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "error"
        }
    };

    let llm = match state.llm.is_available() {
        true => LlmStatus {
            status: "available".to_string(),
            provider: Some(state.llm.backend().label().to_string()),
            model: state.config.llm.as_ref().map(|c| c.model.clone()),
        },
        false => LlmStatus {
            status: "unavailable".to_string(),
            provider: None,
            model: None,
        },
    };

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseStatus {
            status: database.to_string(),
            replica,
        },
        llm,
        drug_registry: state.config.drug_registry.is_some().into(),
        push: state.notifier.push_enabled().into(),
    })
}
