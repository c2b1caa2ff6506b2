use thiserror::Error;

/// Text recorded as the assistant turn whenever a completion fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error. Please check your API key and try again.";

/// Any failure while opening or consuming a completion stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompletionError {
    message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::new(err.to_string())
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::new(format!("malformed response: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("temperature {0} is outside 0.0..=1.0")]
    Temperature(f32),

    #[error("max tokens {0} is outside 100..=4000")]
    MaxTokens(u32),

    #[error("unsupported model `{0}`")]
    UnknownModel(String),
}

/// Errors raised before a request is attempted. None of them touch the
/// transcript.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    #[error("Please enter your Groq API key in the sidebar!")]
    MissingCredential,

    #[error("message is empty")]
    EmptyPrompt,

    #[error("invalid settings: {0}")]
    InvalidConfig(#[from] ConfigError),
}

pub type ChatResult<T> = Result<T, ChatError>;
