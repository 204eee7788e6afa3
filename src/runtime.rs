//! Runtime for running conversations
//!
//! Sessions live in memory. Each one owns its `ConversationState`, so the
//! order survives between turns until it is placed.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ConversationDriver, DriverConfig};
#[cfg(test)]
pub use executor::APOLOGY_PREFIX;
pub use traits::*;

use crate::conversation::ConversationState;
use crate::system_prompt::WELCOME_MESSAGE;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One line of the display transcript
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// A chat session
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    conversation: ConversationState,
    transcript: Vec<TranscriptEntry>,
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub transcript: Vec<TranscriptEntry>,
    pub order: Vec<String>,
    pub finished: bool,
}

/// Outcome of one chat turn
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub order: Vec<String>,
    pub finished: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Manager for all chat sessions
pub struct SessionManager {
    driver: ConversationDriver,
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new(driver: ConversationDriver) -> Self {
        Self {
            driver,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session. The transcript opens with the welcome message.
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session {
            id: id.clone(),
            created_at: Utc::now(),
            conversation: ConversationState::new(),
            transcript: vec![TranscriptEntry::new(Speaker::Assistant, WELCOME_MESSAGE)],
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        tracing::info!(session_id = %id, active = sessions.len(), "Session created");
        id
    }

    async fn get(&self, id: &str) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Drop a session and its history. A turn already running on it
    /// finishes, but the session can no longer be reached.
    pub async fn remove(&self, id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(id).is_none() {
            return Err(SessionError::NotFound(id.to_string()));
        }
        tracing::info!(session_id = %id, active = sessions.len(), "Session removed");
        Ok(())
    }

    /// Run one turn. Turns within a session are serialized.
    pub async fn chat(&self, id: &str, text: &str) -> Result<ChatReply, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;

        session
            .transcript
            .push(TranscriptEntry::new(Speaker::User, text));
        let reply = self
            .driver
            .respond(id, &mut session.conversation, text)
            .await;
        session
            .transcript
            .push(TranscriptEntry::new(Speaker::Assistant, reply.clone()));

        Ok(ChatReply {
            reply,
            order: session.conversation.order.lines().to_vec(),
            finished: session.conversation.finished,
        })
    }

    pub async fn snapshot(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let session = self.get(id).await?;
        let session = session.lock().await;

        Ok(SessionSnapshot {
            session_id: session.id.clone(),
            created_at: session.created_at,
            transcript: session.transcript.clone(),
            order: session.conversation.order.lines().to_vec(),
            finished: session.conversation.finished,
        })
    }
}
