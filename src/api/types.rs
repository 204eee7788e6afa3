//! API request and response types

use crate::llm::ModelInfo;
use crate::runtime::TranscriptEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response to a chat message
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub order: Vec<String>,
    pub finished: bool,
}

/// Response for session creation
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub welcome: String,
}

/// Session with its transcript
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub transcript: Vec<TranscriptEntry>,
    pub order: Vec<String>,
    pub finished: bool,
}

/// Available models
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
