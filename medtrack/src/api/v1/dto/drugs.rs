//! Drug-information and prescription-scan DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrugInfoResponse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficacy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// `registry` or `generative`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<models::DrugInfo> for DrugInfoResponse {
    fn from(info: models::DrugInfo) -> Self {
        Self {
            name: info.name,
            manufacturer: info.manufacturer,
            category: info.category,
            efficacy: info.efficacy,
            dosage: info.dosage,
            warnings: info.warnings,
            side_effects: info.side_effects,
            storage: info.storage,
            image_url: info.image_url,
            source: info.origin.map(|origin| match origin {
                models::DrugInfoOrigin::Registry => "registry".to_string(),
                models::DrugInfoOrigin::Generative => "generative".to_string(),
            }),
        }
    }
}

/// Query for `GET /v1/drugs/search`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct DrugSearchQuery {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub drug_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    /// Parsed dispensing date; use as a course start date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispensed_on: Option<NaiveDate>,
    /// Date text as read from the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_date: Option<String>,
    pub drugs: Vec<DrugInfoResponse>,
}

impl From<models::ScanAnalysis> for ScanResponse {
    fn from(analysis: models::ScanAnalysis) -> Self {
        Self {
            drug_names: analysis.extraction.drug_names,
            facility: analysis.extraction.facility,
            dispensed_on: analysis.extraction.dispensed_on,
            raw_date: analysis.extraction.raw_date,
            drugs: analysis.drugs.into_iter().map(Into::into).collect(),
        }
    }
}
