//! Remote text-generation providers.
//!
//! Each provider wraps the user's prompt in its own instruction template and
//! returns a single reply string. The reply pipeline tries them in order.

pub mod gemini;
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use game_core::retry::Retryable;
use serde::Deserialize;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Content filtered")]
    ContentFiltered,
}

impl ProviderError {
    /// Label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::NetworkError(_) => "network",
            ProviderError::HttpError { .. } => "http",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::ContentFiltered => "content_filtered",
        }
    }

    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            ProviderError::RateLimited
        } else {
            ProviderError::HttpError {
                status: status.as_u16(),
                body,
            }
        }
    }
}

impl Retryable for ProviderError {
    fn is_retryable(&self) -> bool {
        match self {
            ProviderError::NetworkError(_) | ProviderError::RateLimited => true,
            ProviderError::HttpError { status, .. } => *status == 408 || *status >= 500,
            ProviderError::NotConfigured(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::EmptyResponse
            | ProviderError::ContentFiltered => false,
        }
    }
}

/// Decoding parameters applied to every request a provider sends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Only sent to providers that understand it.
    pub top_k: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 100,
            temperature: 0.9,
            top_p: 0.8,
            top_k: None,
        }
    }
}

/// Instruction that frames the user's question for the model.
pub const DEFAULT_INSTRUCTION: &str = "Ты веселый абсурдный бот для игры \"Абсурдная Игра\". \
Отвечай очень кратко (максимум 2-3 предложения), весело и абсурдно. \
Используй эмодзи. Будь дружелюбным, но немного сумасшедшим.";

/// Embed the prompt into a single-turn instruction.
pub fn render_prompt(instruction: &str, prompt: &str) -> String {
    format!("{instruction}\n\nВопрос пользователя: \"{prompt}\"")
}

/// Trait for reply generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &str;

    /// Generate one reply for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
