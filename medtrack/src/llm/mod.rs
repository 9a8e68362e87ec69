mod api;
pub mod prompts;
mod provider;
mod vision;

pub use api::{strip_code_fences, LlmApiClient};
pub use provider::{CompletionOptions, LlmBackend, LlmProvider};
pub use vision::VisionClient;
