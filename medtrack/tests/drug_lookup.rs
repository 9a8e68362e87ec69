use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medtrack::config::{DrugRegistryConfig, LlmConfig};
use medtrack::drugs::{DrugInfoProvider, DrugInfoSource, GenerativeDrugInfo, RegistryClient};
use medtrack::llm::LlmProvider;
use medtrack::models::DrugInfoOrigin;

const TYLENOL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <header><resultCode>00</resultCode><resultMsg>NORMAL SERVICE.</resultMsg></header>
  <body>
    <items>
      <item>
        <entpName>Janssen</entpName>
        <itemName>Tylenol Tab 500mg</itemName>
        <efcyQesitm>Relieves fever and pain.</efcyQesitm>
        <useMethodQesitm>1-2 tablets every 4-6 hours.</useMethodQesitm>
      </item>
    </items>
    <numOfRows>10</numOfRows><pageNo>1</pageNo><totalCount>1</totalCount>
  </body>
</response>"#;

const NOTHING: &str = r#"<response>
  <header><resultCode>00</resultCode><resultMsg>NORMAL SERVICE.</resultMsg></header>
  <body><items></items><totalCount>0</totalCount></body>
</response>"#;

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

fn registry(server: &MockServer) -> Arc<dyn DrugInfoSource> {
    let config = DrugRegistryConfig {
        base_url: format!("{}/drugs", server.uri()),
        api_key: "secret".to_string(),
        timeout_secs: 5,
        page_size: 10,
    };
    Arc::new(RegistryClient::new(&config).unwrap())
}

fn generative(server: &MockServer) -> Arc<dyn DrugInfoSource> {
    let config = LlmConfig {
        model: "local-model".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(server.uri()),
        timeout_secs: 5,
        max_retries: 0,
        vision_max_tokens: 500,
    };
    Arc::new(GenerativeDrugInfo::new(LlmProvider::new(Some(&config))))
}

#[tokio::test]
async fn registry_hit_is_used_without_llm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drugs"))
        .and(query_param("itemName", "Tylenol"))
        .and(query_param("serviceKey", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TYLENOL))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let provider = DrugInfoProvider::new(vec![registry(&server), generative(&server)]);
    let best = provider.best_match("Tylenol").await.unwrap();

    assert_eq!(best.name, "Tylenol Tab 500mg");
    assert_eq!(best.manufacturer.as_deref(), Some("Janssen"));
    assert_eq!(best.origin, Some(DrugInfoOrigin::Registry));
}

#[tokio::test]
async fn empty_registry_falls_back_to_llm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drugs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NOTHING))
        .mount(&server)
        .await;
    let reply = json!({
        "name": "Amoxicillin",
        "category": "Antibiotic",
        "efficacy": "Treats bacterial infections.",
        "dosage": "500mg three times a day."
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body(&reply.to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = DrugInfoProvider::new(vec![registry(&server), generative(&server)]);
    let results = provider.search("Amoxicillin").await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].category.as_deref(), Some("Antibiotic"));
    assert_eq!(results[0].origin, Some(DrugInfoOrigin::Generative));
}

#[tokio::test]
async fn registry_outage_falls_back_to_llm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drugs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body(r#"{"efficacy": "Pain relief."}"#)),
        )
        .mount(&server)
        .await;

    let provider = DrugInfoProvider::new(vec![registry(&server), generative(&server)]);
    let best = provider.best_match("Tylenol").await.unwrap();

    // Unnamed replies keep the queried name.
    assert_eq!(best.name, "Tylenol");
    assert_eq!(best.efficacy.as_deref(), Some("Pain relief."));
}

#[tokio::test]
async fn every_source_failing_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = DrugInfoProvider::new(vec![registry(&server)]);

    assert!(provider.search("Tylenol").await.is_empty());
    assert!(provider.best_match("Tylenol").await.is_none());
}
