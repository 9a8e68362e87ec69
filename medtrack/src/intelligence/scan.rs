use serde_json::Value;
use tracing::{debug, info};

use super::dates::parse_flexible_date;
use crate::drugs::DrugInfoProvider;
use crate::error::{MedtrackError, Result};
use crate::llm::{prompts, LlmProvider};
use crate::models::{DrugInfo, ScanAnalysis, ScanExtraction};

const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Reads drug names, facility and date off a prescription-bag photo.
#[derive(Clone)]
pub struct ScanExtractor {
    llm: LlmProvider,
}

impl ScanExtractor {
    pub fn new(llm: LlmProvider) -> Self {
        Self { llm }
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_available()
    }

    pub async fn extract(&self, image: &[u8], mime: &str) -> Result<ScanExtraction> {
        if image.is_empty() {
            return Err(MedtrackError::Validation("Image is empty".to_string()));
        }
        if !ACCEPTED_MIME_TYPES.contains(&mime) {
            return Err(MedtrackError::Validation(format!(
                "Unsupported image type: {mime}"
            )));
        }

        let reply = self
            .llm
            .describe_image_json(&prompts::scan_extraction_prompt(), image, mime)
            .await?;

        Ok(extraction_from_reply(&reply))
    }
}

fn extraction_from_reply(reply: &Value) -> ScanExtraction {
    let drug_names = match reply.get("medicines") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        other => {
            debug!(medicines = ?other, "Scan reply had no medicine list");
            Vec::new()
        }
    };

    let facility = reply
        .get("hospital")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let raw_date = reply
        .get("date")
        .and_then(Value::as_str)
        .map(str::to_string);
    let dispensed_on = raw_date.as_deref().and_then(parse_flexible_date);

    ScanExtraction {
        drug_names,
        facility,
        dispensed_on,
        raw_date,
    }
}

/// Extraction followed by a drug-info lookup for every name found.
#[derive(Clone)]
pub struct ScanService {
    extractor: ScanExtractor,
    drugs: DrugInfoProvider,
}

impl ScanService {
    pub fn new(extractor: ScanExtractor, drugs: DrugInfoProvider) -> Self {
        Self { extractor, drugs }
    }

    pub async fn analyze(&self, image: &[u8], mime: &str) -> Result<ScanAnalysis> {
        let extraction = self.extractor.extract(image, mime).await?;

        let mut drugs = Vec::with_capacity(extraction.drug_names.len());
        for name in &extraction.drug_names {
            if let Some(info) = self.drugs.best_match(name).await {
                drugs.push(info);
            }
        }

        info!(
            found = extraction.drug_names.len(),
            enriched = drugs.len(),
            "Prescription scan analyzed"
        );
        Ok(ScanAnalysis { extraction, drugs })
    }

    pub async fn search_drug(&self, name: &str) -> Vec<DrugInfo> {
        self.drugs.search(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extraction_from_reply() {
        let reply = json!({
            "medicines": ["Tylenol", " ", "Amoxicillin 250mg", 7],
            "hospital": "Seoul Clinic",
            "date": "2024.03.09"
        });

        let extraction = extraction_from_reply(&reply);

        assert_eq!(extraction.drug_names, vec!["Tylenol", "Amoxicillin 250mg"]);
        assert_eq!(extraction.facility.as_deref(), Some("Seoul Clinic"));
        assert_eq!(
            extraction.dispensed_on,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        );
    }

    #[test]
    fn test_non_list_medicines_becomes_empty() {
        let reply = json!({"medicines": "Tylenol", "hospital": null, "date": "unknown"});

        let extraction = extraction_from_reply(&reply);

        assert!(extraction.drug_names.is_empty());
        assert_eq!(extraction.facility, None);
        assert_eq!(extraction.dispensed_on, None);
        assert_eq!(extraction.raw_date.as_deref(), Some("unknown"));
    }

    #[tokio::test]
    async fn test_rejects_bad_input_before_calling_llm() {
        let extractor = ScanExtractor::new(LlmProvider::unavailable("off"));

        let empty = extractor.extract(&[], "image/png").await.unwrap_err();
        assert!(matches!(empty, MedtrackError::Validation(_)));

        let pdf = extractor.extract(b"%PDF", "application/pdf").await.unwrap_err();
        assert!(matches!(pdf, MedtrackError::Validation(_)));

        let unavailable = extractor.extract(b"\x89PNG", "image/png").await.unwrap_err();
        assert!(matches!(unavailable, MedtrackError::LlmUnavailable(_)));
    }
}
