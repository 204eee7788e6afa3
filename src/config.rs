//! Service configuration
//!
//! Read once at startup. Nothing else in the service touches the
//! environment.

use crate::llm::LlmConfig;
use crate::runtime::DriverConfig;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub llm: LlmConfig,
    pub driver: DriverConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset and
    /// unparsable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parsed = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());
        let defaults = DriverConfig::default();

        let port = get("BOOKSTORE_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let llm = LlmConfig {
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            gateway: get("LLM_GATEWAY"),
            default_model: get("DEFAULT_MODEL"),
            timeout: Duration::from_secs(parsed("LLM_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS)),
        };

        let driver = DriverConfig {
            max_round_trips: parsed("BOOKSTORE_MAX_ROUND_TRIPS")
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_round_trips),
            max_tokens: parsed("BOOKSTORE_MAX_TOKENS")
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_tokens),
        };

        Self { port, llm, driver }
    }
}
