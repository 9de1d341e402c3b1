//! Application assembly.
//!
//! Turns a [`GameConfig`] into a ready [`Game`]: picks the phrase source,
//! builds the provider stages in configured order and wires the transcript.

use crate::config::{ChatConfig, GameConfig, PhraseConfig, ProviderConfig, ProviderKind};
use crate::models::ChatTranscript;
use crate::services::game::Game;
use crate::services::metrics::init_metrics;
use crate::services::phrase_source::{DirPhraseSource, HttpPhraseSource, PhraseSource};
use crate::services::pipeline::{ProviderStage, ResponsePipeline};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::openai::{OpenAiConfig, OpenAiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::session::PhraseSession;
use game_core::error::AppError;
use std::sync::Arc;

/// Select the phrase source: a local directory when configured, HTTP otherwise.
pub fn build_phrase_source(config: &PhraseConfig) -> Result<Arc<dyn PhraseSource>, AppError> {
    if let Some(dir) = &config.data_dir {
        if !std::fs::metadata(dir)?.is_dir() {
            return Err(AppError::config(format!(
                "phrases.data_dir is not a directory: {}",
                dir.display()
            )));
        }
        tracing::info!(dir = %dir.display(), "Reading phrases from directory");
        return Ok(Arc::new(DirPhraseSource::new(dir.clone())));
    }

    let source = HttpPhraseSource::new(&config.base_url, config.request_timeout())
        .map_err(|e| AppError::config(format!("phrase source: {e}")))?;
    tracing::info!(base_url = %config.base_url, "Fetching phrases over HTTP");
    Ok(Arc::new(source))
}

/// Build one remote provider. Fails when its API key is not available.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    let api_key = config.api_key()?;

    let provider: Arc<dyn TextProvider> = match config.kind {
        ProviderKind::Gemini => Arc::new(
            GeminiTextProvider::new(GeminiConfig {
                base_url: config.base_url().to_string(),
                api_key,
                model: config.model.clone(),
                instruction: config.instruction().to_string(),
                params: config.generation.clone(),
                timeout: config.timeout(),
            })
            .map_err(|e| AppError::config(e.to_string()))?,
        ),
        ProviderKind::OpenAi => Arc::new(
            OpenAiTextProvider::new(OpenAiConfig {
                base_url: config.base_url().to_string(),
                api_key,
                model: config.model.clone(),
                instruction: config.instruction().to_string(),
                params: config.generation.clone(),
                timeout: config.timeout(),
            })
            .map_err(|e| AppError::config(e.to_string()))?,
        ),
    };

    Ok(provider)
}

/// Build the reply pipeline. Providers without credentials are skipped.
pub fn build_pipeline(config: &ChatConfig) -> ResponsePipeline {
    let stages = config
        .providers
        .iter()
        .filter_map(|entry| match build_provider(entry) {
            Ok(provider) => {
                tracing::info!(
                    provider = provider.name(),
                    model = %entry.model,
                    max_attempts = entry.retry.max_attempts,
                    "Initialized text provider"
                );
                Some(ProviderStage::new(provider, entry.retry.clone()))
            }
            Err(e) => {
                tracing::warn!(model = %entry.model, error = %e, "Skipping text provider");
                None
            }
        })
        .collect::<Vec<_>>();

    if stages.is_empty() {
        tracing::warn!("No remote providers available, chat uses local replies only");
    }

    ResponsePipeline::new(stages)
}

/// Application container.
pub struct Application {
    config: GameConfig,
    game: Game,
}

impl Application {
    pub fn build(config: GameConfig) -> Result<Self, AppError> {
        init_metrics().map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

        let source = build_phrase_source(&config.phrases)?;
        let pipeline = build_pipeline(&config.chat);

        let game = Game::new(
            PhraseSession::new(config.phrases.cursor_policy),
            ChatTranscript::new(config.chat.transcript_capacity),
            source,
            pipeline,
        );

        Ok(Self { config, game })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn game(&self) -> &Game {
        &self.game
    }
}
