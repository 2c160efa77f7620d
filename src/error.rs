use thiserror::Error;

/// Guidance shown when the generation API reports quota, billing or rate limits.
pub const QUOTA_GUIDANCE: &str = "⚠️ API quota exceeded!\n\n\
How to fix it:\n\
1. Create a new API key (Google AI Studio)\n\
2. Try again after 24 hours\n\
3. Consider a paid plan\n\n\
More information: https://ai.google.dev/gemini-api/docs/rate-limits";

#[derive(Debug, Error)]
pub enum BabyFaceError {
    /// Missing photos or age selection. Fixable by the caller, never retried.
    #[error("{0}")]
    InputError(String),

    #[error("{guidance}")]
    QuotaExceeded { status: u16, guidance: String },

    #[error("{message}")]
    ServiceError { status: u16, message: String },

    #[error("No image was generated by the model for one of the requests.")]
    NoImageProduced,

    #[error("The model returned a text response instead of an image: {0}")]
    UnexpectedTextResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BabyFaceError {
    pub fn input(message: impl Into<String>) -> Self {
        BabyFaceError::InputError(message.into())
    }

    pub fn quota_exceeded(status: u16) -> Self {
        BabyFaceError::QuotaExceeded {
            status,
            guidance: QUOTA_GUIDANCE.to_string(),
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, BabyFaceError::InputError(_))
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, BabyFaceError::QuotaExceeded { .. })
    }
}

impl From<reqwest::Error> for BabyFaceError {
    fn from(err: reqwest::Error) -> Self {
        BabyFaceError::TransportError(err.to_string())
    }
}

impl From<serde_json::Error> for BabyFaceError {
    fn from(err: serde_json::Error) -> Self {
        BabyFaceError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BabyFaceError>;
