use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Empty disables learned-model review.
    pub anthropic_api_key: String,
    pub model: String,
    pub llm_timeout_secs: u64,
    pub max_tokens: u32,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 120,
            max_tokens: 4096,
            server_host: "0.0.0.0".into(),
            server_port: 8080,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: std::env::var("CLAUSEGRAPH_MODEL").unwrap_or(defaults.model),
            llm_timeout_secs: parse_env("CLAUSEGRAPH_LLM_TIMEOUT_SECS")
                .unwrap_or(defaults.llm_timeout_secs),
            max_tokens: parse_env("CLAUSEGRAPH_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    pub fn ai_review_enabled(&self) -> bool {
        !self.anthropic_api_key.trim().is_empty()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}
