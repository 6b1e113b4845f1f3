//! Async HTTP LLM client
//!
//! Model-agnostic client for Anthropic and OpenAI-compatible APIs
//! (OpenAI, DeepSeek, ...). Web search is available when a search model is
//! configured; it is called through an OpenAI-compatible endpoint.

use crate::core::error::{EngineError, Result};
use crate::llm::{ChatMessage, Completion, LanguageModel, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// OpenAI-compatible endpoint used for web search
#[derive(Debug, Clone)]
pub struct SearchEndpoint {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    max_tokens: u32,
    search: Option<SearchEndpoint>,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
            max_tokens: 4096,
            search: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_search(mut self, search: SearchEndpoint) -> Self {
        self.search = Some(search);
        self
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    /// Optional: LLM_MAX_TOKENS
    /// Optional: LLM_SEARCH_MODEL enables web search, with
    /// LLM_SEARCH_API_URL (defaults to Perplexity) and LLM_SEARCH_API_KEY
    /// (defaults to LLM_API_KEY)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY").map_err(|_| EngineError::NoLlmConfigured)?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".into());

        let mut client = Self::new(api_key.clone(), api_url, model);

        if let Ok(max_tokens) = std::env::var("LLM_MAX_TOKENS") {
            let max_tokens = max_tokens
                .parse()
                .map_err(|_| EngineError::Config(format!("LLM_MAX_TOKENS is not a number: {}", max_tokens)))?;
            client = client.with_max_tokens(max_tokens);
        }

        if let Ok(search_model) = std::env::var("LLM_SEARCH_MODEL") {
            client = client.with_search(SearchEndpoint {
                api_key: std::env::var("LLM_SEARCH_API_KEY").unwrap_or(api_key),
                api_url: std::env::var("LLM_SEARCH_API_URL")
                    .unwrap_or_else(|_| "https://api.perplexity.ai/chat/completions".into()),
                model: search_model,
            });
        }

        Ok(client)
    }

    async fn complete_anthropic(&self, messages: &[ChatMessage]) -> Result<String> {
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system,
            messages: messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(Message::from)
                .collect(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| EngineError::LlmError(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| EngineError::LlmError("Empty response".into()))
    }

    async fn complete_openai(
        &self,
        api_url: &str,
        api_key: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String> {
        let request = OpenAIRequest {
            model: model.to_string(),
            max_tokens: self.max_tokens,
            messages: messages.iter().map(Message::from).collect(),
        };

        let response = self
            .client
            .post(api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| EngineError::LlmError(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| EngineError::LlmError("Empty response".into()))
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let content = match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(messages).await?,
            ApiFormat::OpenAI => {
                self.complete_openai(&self.api_url, &self.api_key, &self.model, messages)
                    .await?
            }
        };
        Ok(Completion { content })
    }

    fn supports_web_search(&self) -> bool {
        self.search.is_some()
    }

    async fn web_search(&self, query: &str, system_prompt: &str) -> Result<Completion> {
        let search = self.search.as_ref().ok_or(EngineError::WebSearchUnavailable)?;
        let messages = [ChatMessage::system(system_prompt), ChatMessage::user(query)];
        let content = self
            .complete_openai(&search.api_url, &search.api_key, &search.model, &messages)
            .await?;
        Ok(Completion { content })
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: Role,
    content: String,
}

impl From<&ChatMessage> for Message {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LlmClient::new(
            "test-key".into(),
            "https://api.example.com".into(),
            "test-model".into(),
        );
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.api_url, "https://api.example.com");
        assert_eq!(client.model, "test-model");
        assert_eq!(client.api_format, ApiFormat::OpenAI);
        assert!(!client.supports_web_search());
    }

    #[test]
    fn test_anthropic_format_detected() {
        let client = LlmClient::new(
            "k".into(),
            "https://api.anthropic.com/v1/messages".into(),
            "m".into(),
        );
        assert_eq!(client.api_format, ApiFormat::Anthropic);
    }

    #[test]
    fn test_search_endpoint_enables_web_search() {
        let client = LlmClient::new("k".into(), "https://api.example.com".into(), "m".into())
            .with_search(SearchEndpoint {
                api_key: "k".into(),
                api_url: "https://search.example.com".into(),
                model: "sonar".into(),
            });
        assert!(client.supports_web_search());
    }

    #[test]
    fn test_message_role_serialization() {
        let message = Message::from(&ChatMessage::system("rules"));
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"rules"}"#);
    }

    #[test]
    fn test_from_env_missing_key() {
        let result = LlmClient::from_env();
        if std::env::var("LLM_API_KEY").is_err() {
            assert!(matches!(result, Err(EngineError::NoLlmConfigured)));
        }
    }
}
