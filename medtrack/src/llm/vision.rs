use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{MedtrackError, Result};
use crate::llm::api::ApiConfig;

/// OpenAI-compatible chat client for prompts that carry an image.
#[derive(Clone, Debug)]
pub struct VisionClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

impl VisionClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api = ApiConfig::from_llm_config(config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| MedtrackError::Llm(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api.api_key,
            base_url: api.base_url,
            model: api.model,
            max_tokens: config.vision_max_tokens,
            max_retries: api.max_retries,
        })
    }

    /// Sends `prompt` together with the image and returns the reply text.
    pub async fn describe(&self, prompt: &str, image_bytes: &[u8], mime: &str) -> Result<String> {
        if image_bytes.is_empty() {
            return Err(MedtrackError::Validation("Image is empty".to_string()));
        }

        let data_url = format!("data:{mime};base64,{}", STANDARD.encode(image_bytes));
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: 0.1,
        };

        self.make_request(&request).await
    }

    async fn make_request(&self, request: &ChatRequest) -> Result<String> {
        let mut retries = 0;

        loop {
            let mut builder = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .json(request);
            if let Some(ref key) = self.api_key {
                builder = builder.bearer_auth(key);
            }

            match builder.send().await {
                Ok(resp) if resp.status().is_success() => {
                    let chat_response: ChatResponse = resp.json().await.map_err(|e| {
                        MedtrackError::Llm(format!("Failed to parse vision response: {e}"))
                    })?;

                    return chat_response
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message.content)
                        .filter(|c| !c.trim().is_empty())
                        .ok_or_else(|| MedtrackError::Llm("Empty vision response".to_string()));
                }
                Ok(resp) if resp.status().as_u16() == 429 => {
                    return Err(MedtrackError::LlmRateLimit { retry_after: None });
                }
                Ok(resp) if resp.status().is_server_error() && retries < self.max_retries => {
                    retries += 1;
                    tracing::debug!(status = %resp.status(), retries, "Retrying vision request");
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(MedtrackError::Llm(format!(
                        "Vision request failed: {status} - {body}"
                    )));
                }
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    tracing::debug!(error = %e, retries, "Retrying vision request");
                }
                Err(e) => return Err(MedtrackError::Http(e)),
            }

            let delay = Duration::from_millis(100 * 2_u64.pow(retries));
            tokio::time::sleep(delay).await;
        }
    }
}
