//! Centralized model definitions for all LLM providers

use super::anthropic::{AnthropicModel, AnthropicService};
use super::gemini::{GeminiModel, GeminiService};
use super::LlmService;
use std::sync::Arc;
use std::time::Duration;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Gemini => "Google",
            Provider::Anthropic => "Anthropic",
        }
    }
}

/// Factory signature: `(api_key, gateway, timeout)`
pub type ServiceFactory = fn(&str, Option<&str>, Duration) -> Result<Arc<dyn LlmService>, String>;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gemini-2.0-flash")
    pub id: &'static str,
    pub provider: Provider,
    /// Human-readable description
    pub description: &'static str,
    pub factory: ServiceFactory,
}

fn build_gemini(
    model: GeminiModel,
    api_key: &str,
    gateway: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmService>, String> {
    let service =
        GeminiService::new(api_key.to_string(), model, gateway, timeout).map_err(|e| e.message)?;
    Ok(Arc::new(service))
}

fn build_anthropic(
    model: AnthropicModel,
    api_key: &str,
    gateway: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmService>, String> {
    let service = AnthropicService::new(api_key.to_string(), model, gateway, timeout)
        .map_err(|e| e.message)?;
    Ok(Arc::new(service))
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gemini-2.0-flash",
            provider: Provider::Gemini,
            description: "Gemini 2.0 Flash (fast, default)",
            factory: |key, gw, timeout| build_gemini(GeminiModel::Gemini20Flash, key, gw, timeout),
        },
        ModelDef {
            id: "gemini-1.5-flash",
            provider: Provider::Gemini,
            description: "Gemini 1.5 Flash",
            factory: |key, gw, timeout| build_gemini(GeminiModel::Gemini15Flash, key, gw, timeout),
        },
        ModelDef {
            id: "gemini-2.5-pro",
            provider: Provider::Gemini,
            description: "Gemini 2.5 Pro (most capable, slower)",
            factory: |key, gw, timeout| build_gemini(GeminiModel::Gemini25Pro, key, gw, timeout),
        },
        ModelDef {
            id: "claude-4-sonnet",
            provider: Provider::Anthropic,
            description: "Claude Sonnet 4",
            factory: |key, gw, timeout| build_anthropic(AnthropicModel::Claude4Sonnet, key, gw, timeout),
        },
        ModelDef {
            id: "claude-3.5-haiku",
            provider: Provider::Anthropic,
            description: "Claude 3.5 Haiku (fast, cheap)",
            factory: |key, gw, timeout| build_anthropic(AnthropicModel::Claude35Haiku, key, gw, timeout),
        },
    ]
}
