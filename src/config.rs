use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{BabyFaceError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Minimum pause between two calls of one batch.
pub const DEFAULT_INTER_CALL_DELAY: Duration = Duration::from_secs(4);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub inter_call_delay: Duration,
    pub timeout: Duration,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("inter_call_delay", &self.inter_call_delay)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            inter_call_delay: DEFAULT_INTER_CALL_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let model = env::var("GEMINI_MODEL").unwrap_or(defaults.model);
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url);
        let inter_call_delay = env::var("GEMINI_INTER_CALL_DELAY_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.inter_call_delay);
        let timeout = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        GeminiConfig {
            api_key,
            model,
            base_url,
            inter_call_delay,
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_inter_call_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The credential, or a `ConfigError` when none is set.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                BabyFaceError::ConfigError(
                    "GEMINI_API_KEY (or API_KEY) environment variable is not set".into(),
                )
            })
    }

    pub fn validate(&self) -> Result<()> {
        self.api_key()?;
        if self.model.trim().is_empty() {
            return Err(BabyFaceError::ConfigError("Model name must not be empty".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(BabyFaceError::ConfigError("Base URL must not be empty".into()));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim_start_matches("models/")
        )
    }
}
