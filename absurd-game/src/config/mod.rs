use crate::models::transcript::DEFAULT_TRANSCRIPT_CAPACITY;
use crate::services::providers::gemini::GEMINI_API_BASE;
use crate::services::providers::openai::OPENAI_API_BASE;
use crate::services::providers::{GenerationParams, DEFAULT_INSTRUCTION};
use crate::services::session::CursorPolicy;
use game_core::config as core_config;
use game_core::error::AppError;
use game_core::retry::RetryConfig;
use secrecy::SecretString;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default phrase location: the static `data/` directory next to the page.
const DEFAULT_PHRASES_BASE_URL: &str = "http://localhost:8000/data";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub logging: core_config::Config,
    #[serde(default)]
    pub phrases: PhraseConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhraseConfig {
    /// Base URL serving `<genre>.json` files.
    #[serde(default = "default_phrases_base_url")]
    pub base_url: String,
    /// Read phrases from this directory instead of `base_url` when set.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub cursor_policy: CursorPolicy,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_transcript_capacity")]
    pub transcript_capacity: usize,
    /// Remote stages, tried in order before the local responder.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Defaults to the vendor's public endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub generation: GenerationParams,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_phrases_base_url() -> String {
    DEFAULT_PHRASES_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_transcript_capacity() -> usize {
    DEFAULT_TRANSCRIPT_CAPACITY
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            kind: ProviderKind::Gemini,
            base_url: None,
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            instruction: None,
            generation: GenerationParams::default(),
            retry: RetryConfig::default(),
            timeout_secs: default_request_timeout_secs(),
        },
        ProviderConfig {
            kind: ProviderKind::OpenAi,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            instruction: None,
            generation: GenerationParams::default(),
            retry: RetryConfig::no_retry(),
            timeout_secs: default_request_timeout_secs(),
        },
    ]
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            base_url: default_phrases_base_url(),
            data_dir: None,
            cursor_policy: CursorPolicy::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            transcript_capacity: default_transcript_capacity(),
            providers: default_providers(),
        }
    }
}

impl GameConfig {
    /// Load from `configuration.{toml,yaml,json}` plus `APP__*` overrides.
    pub fn load() -> Result<Self, AppError> {
        core_config::load_layered("configuration")
    }
}

impl PhraseConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ProviderConfig {
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.kind) {
            (Some(url), _) => url,
            (None, ProviderKind::Gemini) => GEMINI_API_BASE,
            (None, ProviderKind::OpenAi) => OPENAI_API_BASE,
        }
    }

    pub fn instruction(&self) -> &str {
        self.instruction.as_deref().unwrap_or(DEFAULT_INSTRUCTION)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<SecretString, AppError> {
        match env::var(&self.api_key_env) {
            Ok(val) if !val.trim().is_empty() => Ok(SecretString::new(val)),
            _ => Err(AppError::config(format!(
                "{} is required but not set",
                self.api_key_env
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_providers_order() {
        let chat = ChatConfig::default();
        assert_eq!(chat.providers.len(), 2);
        assert_eq!(chat.providers[0].kind, ProviderKind::Gemini);
        assert_eq!(chat.providers[0].retry.max_attempts, 3);
        assert_eq!(chat.providers[1].kind, ProviderKind::OpenAi);
        assert_eq!(chat.providers[1].retry.max_attempts, 1);
    }

    #[test]
    fn test_base_url_falls_back_to_vendor() {
        let provider = &ChatConfig::default().providers[0];
        assert_eq!(provider.base_url(), GEMINI_API_BASE);
        assert_eq!(provider.instruction(), DEFAULT_INSTRUCTION);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let provider = ProviderConfig {
            api_key_env: "ABSURD_GAME_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ChatConfig::default().providers[0].clone()
        };
        assert!(matches!(provider.api_key(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_deserialize_provider_list() {
        let json = r#"{
            "phrases": { "cursor_policy": "sequential", "data_dir": "data" },
            "chat": {
                "transcript_capacity": 20,
                "providers": [
                    {
                        "kind": "openai",
                        "model": "gpt-4o-mini",
                        "api_key_env": "OPENAI_API_KEY",
                        "retry": { "max_attempts": 2, "initial_backoff": 250 },
                        "generation": { "temperature": 0.5 }
                    }
                ]
            }
        }"#;

        let config: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.phrases.cursor_policy, CursorPolicy::Sequential);
        assert_eq!(config.phrases.data_dir, Some(PathBuf::from("data")));
        assert_eq!(config.chat.transcript_capacity, 20);

        let provider = &config.chat.providers[0];
        assert_eq!(provider.kind, ProviderKind::OpenAi);
        assert_eq!(provider.retry.max_attempts, 2);
        assert_eq!(provider.retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(provider.generation.temperature, 0.5);
        assert_eq!(provider.generation.max_output_tokens, 100);
        assert_eq!(provider.base_url(), OPENAI_API_BASE);
    }
}
