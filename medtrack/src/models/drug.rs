use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrugInfoOrigin {
    Registry,
    Generative,
}

/// Reference information about a single drug product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DrugInfo {
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub efficacy: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub origin: Option<DrugInfoOrigin>,
}

/// Fields read off a photographed prescription bag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanExtraction {
    pub drug_names: Vec<String>,
    pub facility: Option<String>,
    pub dispensed_on: Option<NaiveDate>,
    pub raw_date: Option<String>,
}

/// Extraction plus per-drug enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanAnalysis {
    pub extraction: ScanExtraction,
    pub drugs: Vec<DrugInfo>,
}
