use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{MedtrackError, Result};
use crate::llm::api::{parse_json_reply, LlmApiClient};
use crate::llm::vision::VisionClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

impl LlmBackend {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
            Self::LmStudio => "lmstudio",
            Self::OpenAICompatible { .. } => "openai-compatible",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Entry point for text and image completions. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => match &config.base_url {
                Some(base_url) => LlmBackend::OpenAICompatible {
                    base_url: base_url.clone(),
                },
                None => LlmBackend::Unavailable {
                    reason: format!("Unknown provider in model: {}", config.model),
                },
            },
        };

        Self {
            backend,
            config: Some(Arc::new(config.clone())),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    fn available_config(&self) -> Result<&LlmConfig> {
        if let LlmBackend::Unavailable { reason } = &self.backend {
            return Err(MedtrackError::LlmUnavailable(reason.clone()));
        }
        self.config
            .as_deref()
            .ok_or_else(|| MedtrackError::LlmUnavailable("No config available".to_string()))
    }

    pub async fn complete_json(
        &self,
        prompt: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<Value> {
        let client = LlmApiClient::new(self.available_config()?)?;
        client.complete_json(prompt, options).await
    }

    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        prompt: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<T> {
        let json_value = self.complete_json(prompt, options).await?;

        serde_json::from_value(json_value)
            .map_err(|e| MedtrackError::Llm(format!("Failed to deserialize response: {e}")))
    }

    /// Image + prompt completion parsed as JSON.
    pub async fn describe_image_json(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime: &str,
    ) -> Result<Value> {
        let client = VisionClient::new(self.available_config()?)?;
        let content = client.describe(prompt, image_bytes, mime).await?;
        parse_json_reply(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str, base_url: Option<&str>) -> LlmConfig {
        LlmConfig {
            model: model.to_string(),
            api_key: Some("k".to_string()),
            base_url: base_url.map(str::to_string),
            timeout_secs: 5,
            max_retries: 0,
            vision_max_tokens: 1500,
        }
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!(
            LlmProvider::new(Some(&config("openai/gpt-4o", None))).backend(),
            &LlmBackend::OpenAI
        );
        assert!(matches!(
            LlmProvider::new(Some(&config("custom-model", Some("http://x/v1")))).backend(),
            LlmBackend::OpenAICompatible { .. }
        ));
        assert!(!LlmProvider::new(Some(&config("custom-model", None))).is_available());
        assert!(!LlmProvider::new(None).is_available());
    }

    #[test]
    fn test_backend_label() {
        assert_eq!(LlmBackend::Ollama.label(), "ollama");
        assert_eq!(
            LlmProvider::new(Some(&config("my-model", Some("http://localhost:1234"))))
                .backend()
                .label(),
            "openai-compatible"
        );
        assert_eq!(LlmProvider::unavailable("off").backend().label(), "unavailable");
    }

    #[tokio::test]
    async fn test_unavailable_provider_errors() {
        let provider = LlmProvider::unavailable("off");
        let err = provider.complete_json("hi", None).await.unwrap_err();
        assert!(matches!(err, MedtrackError::LlmUnavailable(_)));
    }
}
