//! LLM collaborator interface, HTTP client and response parsing
//!
//! The engine only depends on the `LanguageModel` trait; `client::LlmClient`
//! is the production implementation and tests substitute scripted models.

pub mod client;
pub mod parser;

use crate::core::error::{EngineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Raw model output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
}

impl Completion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A model the engine can prompt
///
/// `web_search` is optional; implementations that support it must also
/// return `true` from `supports_web_search`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion>;

    fn supports_web_search(&self) -> bool {
        false
    }

    async fn web_search(&self, _query: &str, _system_prompt: &str) -> Result<Completion> {
        Err(EngineError::WebSearchUnavailable)
    }
}
