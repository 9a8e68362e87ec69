use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub course: CourseConfig,
    pub llm: Option<LlmConfig>,
    pub drug_registry: Option<DrugRegistryConfig>,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    /// Seconds between pulls from the primary when running as an embedded replica.
    pub sync_interval_secs: u64,
}

impl DatabaseConfig {
    pub fn is_replica(&self) -> bool {
        self.local_path.is_some()
            && (self.url.starts_with("libsql://") || self.url.starts_with("https://"))
    }
}

/// Limits applied when a new course is started.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseConfig {
    pub max_duration_days: u32,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            max_duration_days: 90,
        }
    }
}

/// LLM configuration for chat/completion and vision models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub vision_max_tokens: u32,
}

/// Government drug registry (e-Drug easy information service)
#[derive(Debug, Clone, Deserialize)]
pub struct DrugRegistryConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub page_size: u32,
}

pub const DEFAULT_DRUG_REGISTRY_URL: &str =
    "http://apis.data.go.kr/1471000/DrbEasyDrugInfoService/getDrbEasyDrugList";

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Global switch for push delivery. Inbox rows are written regardless.
    pub telegram_enabled: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_base: String,
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            telegram_enabled: false,
            telegram_bot_token: None,
            telegram_api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
        }
    }
}

impl NotificationConfig {
    /// Push is only attempted when the switch is on and a bot token exists.
    pub fn push_enabled(&self) -> bool {
        self.telegram_enabled
            && self
                .telegram_bot_token
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("MEDTRACK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("MEDTRACK_PORT", 3000),
                api_keys: env::var("MEDTRACK_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:medtrack.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                sync_interval_secs: parse_env_or("DATABASE_SYNC_INTERVAL", 60),
            },
            course: CourseConfig {
                max_duration_days: parse_env_or("COURSE_MAX_DURATION_DAYS", 90),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
                vision_max_tokens: parse_env_or("VISION_MAX_TOKENS", 1500),
            }),
            drug_registry: parse_env_opt::<String>("DRUG_REGISTRY_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .map(|api_key| DrugRegistryConfig {
                    base_url: env::var("DRUG_REGISTRY_URL")
                        .unwrap_or_else(|_| DEFAULT_DRUG_REGISTRY_URL.to_string()),
                    api_key,
                    timeout_secs: parse_env_or("DRUG_REGISTRY_TIMEOUT", 10),
                    page_size: parse_env_or("DRUG_REGISTRY_PAGE_SIZE", 10),
                }),
            notifications: NotificationConfig {
                telegram_enabled: parse_env_or("TELEGRAM_ENABLED", false),
                telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
                telegram_api_base: env::var("TELEGRAM_API_BASE")
                    .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
                timeout_secs: parse_env_or("TELEGRAM_TIMEOUT", 10),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
