use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medtrack::config::LlmConfig;
use medtrack::drugs::{DrugInfoProvider, DrugInfoSource, GenerativeDrugInfo};
use medtrack::error::MedtrackError;
use medtrack::intelligence::{ScanExtractor, ScanService};
use medtrack::llm::LlmProvider;

const PNG_STUB: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "local-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
    })
}

fn llm(server: &MockServer) -> LlmProvider {
    LlmProvider::new(Some(&LlmConfig {
        model: "local-model".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(server.uri()),
        timeout_secs: 5,
        max_retries: 0,
        vision_max_tokens: 500,
    }))
}

#[tokio::test]
async fn scan_without_drug_sources_returns_extraction_only() {
    let server = MockServer::start().await;
    let reply = json!({
        "medicines": ["Tylenol", "Amoxicillin"],
        "hospital": "Seoul Clinic",
        "date": "2024년 3월 1일"
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body(&format!("```json\n{reply}\n```"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = ScanService::new(ScanExtractor::new(llm(&server)), DrugInfoProvider::default());
    let analysis = service.analyze(PNG_STUB, "image/png").await.unwrap();

    assert_eq!(analysis.extraction.drug_names, vec!["Tylenol", "Amoxicillin"]);
    assert_eq!(analysis.extraction.facility.as_deref(), Some("Seoul Clinic"));
    assert_eq!(
        analysis.extraction.dispensed_on,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
    );
    assert!(analysis.drugs.is_empty());
}

#[tokio::test]
async fn unreadable_date_is_kept_raw() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"medicines": [], "hospital": null, "date": "unknown"}"#,
        )))
        .mount(&server)
        .await;

    let service = ScanService::new(ScanExtractor::new(llm(&server)), DrugInfoProvider::default());
    let analysis = service.analyze(PNG_STUB, "image/png").await.unwrap();

    assert!(analysis.extraction.drug_names.is_empty());
    assert_eq!(analysis.extraction.dispensed_on, None);
    assert_eq!(analysis.extraction.raw_date.as_deref(), Some("unknown"));
}

#[tokio::test]
async fn scan_enriches_names_through_drug_sources() {
    let server = MockServer::start().await;
    // Every completion is answered with the same body: the scan reads
    // `medicines`, the drug lookup reads `category`.
    let reply = json!({
        "medicines": ["Tylenol"],
        "date": "24.03.01",
        "category": "Analgesic"
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(&reply.to_string())))
        .expect(2)
        .mount(&server)
        .await;

    let drugs: Arc<dyn DrugInfoSource> = Arc::new(GenerativeDrugInfo::new(llm(&server)));
    let service = ScanService::new(
        ScanExtractor::new(llm(&server)),
        DrugInfoProvider::new(vec![drugs]),
    );
    let analysis = service.analyze(PNG_STUB, "image/png").await.unwrap();

    assert_eq!(
        analysis.extraction.dispensed_on,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
    );
    assert_eq!(analysis.drugs.len(), 1);
    assert_eq!(analysis.drugs[0].name, "Tylenol");
    assert_eq!(analysis.drugs[0].category.as_deref(), Some("Analgesic"));
}

#[tokio::test]
async fn unsupported_image_type_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let service = ScanService::new(ScanExtractor::new(llm(&server)), DrugInfoProvider::default());
    let err = service
        .analyze(b"%PDF-1.4", "application/pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, MedtrackError::Validation(_)));
}
