use async_trait::async_trait;
use serde::Deserialize;

use super::DrugInfoSource;
use crate::error::Result;
use crate::llm::{prompts, CompletionOptions, LlmProvider};
use crate::models::{DrugInfo, DrugInfoOrigin};

/// Asks the configured LLM for drug information when the registry has none.
#[derive(Clone)]
pub struct GenerativeDrugInfo {
    llm: LlmProvider,
}

#[derive(Debug, Deserialize)]
struct GenerativeReply {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    efficacy: Option<String>,
    #[serde(default)]
    dosage: Option<String>,
    #[serde(default)]
    warnings: Option<String>,
    #[serde(default)]
    side_effects: Option<String>,
    #[serde(default)]
    storage: Option<String>,
}

impl GenerativeDrugInfo {
    pub fn new(llm: LlmProvider) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl DrugInfoSource for GenerativeDrugInfo {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn lookup(&self, drug_name: &str) -> Result<Vec<DrugInfo>> {
        let options = CompletionOptions {
            temperature: Some(0.3),
            max_tokens: Some(800),
        };
        let reply: GenerativeReply = self
            .llm
            .complete_structured(&prompts::drug_info_prompt(drug_name), Some(&options))
            .await?;

        Ok(vec![DrugInfo {
            name: reply
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| drug_name.to_string()),
            manufacturer: None,
            category: reply.category,
            efficacy: reply.efficacy,
            dosage: reply.dosage,
            warnings: reply.warnings,
            side_effects: reply.side_effects,
            storage: reply.storage,
            image_url: None,
            origin: Some(DrugInfoOrigin::Generative),
        }])
    }
}
