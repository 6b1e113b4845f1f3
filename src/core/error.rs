use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No LLM access configured")]
    NoLlmConfigured,

    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Web search is not available for this client")]
    WebSearchUnavailable,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl EngineError {
    /// Errors raised before any prompt work begins
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NoLlmConfigured | Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
