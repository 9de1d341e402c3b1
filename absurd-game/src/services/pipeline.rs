//! Reply pipeline: remote providers in order, then the local responder.
//!
//! `get_reply` never fails. Provider errors are logged, counted and absorbed;
//! the caller only ever sees a non-empty string.

use crate::services::metrics;
use crate::services::providers::TextProvider;
use crate::services::responder::LocalResponder;
use game_core::retry::{retry_with_backoff, RetryConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One remote stage with its own retry policy.
#[derive(Clone)]
pub struct ProviderStage {
    pub provider: Arc<dyn TextProvider>,
    pub retry: RetryConfig,
}

impl ProviderStage {
    pub fn new(provider: Arc<dyn TextProvider>, retry: RetryConfig) -> Self {
        Self { provider, retry }
    }
}

/// Which stage produced a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Provider(String),
    Local,
}

impl ReplySource {
    pub fn label(&self) -> &str {
        match self {
            ReplySource::Provider(name) => name,
            ReplySource::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

#[derive(Clone, Default)]
pub struct ResponsePipeline {
    stages: Vec<ProviderStage>,
    responder: LocalResponder,
}

impl ResponsePipeline {
    pub fn new(stages: Vec<ProviderStage>) -> Self {
        Self {
            stages,
            responder: LocalResponder::new(),
        }
    }

    /// A pipeline with no remote stages answers from the local responder only.
    pub fn local_only() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[ProviderStage] {
        &self.stages
    }

    /// Upper bound on time spent sleeping between retries across all stages.
    pub fn max_backoff_budget(&self) -> Duration {
        self.stages.iter().map(|s| s.retry.total_backoff()).sum()
    }

    /// Turn one prompt into exactly one non-empty reply.
    pub async fn get_reply(&self, prompt: &str) -> String {
        self.reply(prompt).await.text
    }

    /// Like [`get_reply`](Self::get_reply), also reporting the producing stage.
    pub async fn reply(&self, prompt: &str) -> Reply {
        let prompt = prompt.trim();

        if !prompt.is_empty() {
            for stage in &self.stages {
                if let Some(text) = self.run_stage(stage, prompt).await {
                    let source = ReplySource::Provider(stage.provider.name().to_string());
                    metrics::record_chat_reply(source.label());
                    return Reply { text, source };
                }
            }
        }

        let text = self.responder.respond(prompt).to_string();
        tracing::info!(stage = "local", "Answered from local responder");
        metrics::record_chat_reply(ReplySource::Local.label());
        Reply {
            text,
            source: ReplySource::Local,
        }
    }

    async fn run_stage(&self, stage: &ProviderStage, prompt: &str) -> Option<String> {
        let name = stage.provider.name();
        let started = Instant::now();

        let result = retry_with_backoff(&stage.retry, name, || stage.provider.generate(prompt)).await;

        metrics::record_provider_latency(name, started.elapsed().as_secs_f64());

        match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::warn!(provider = name, "Provider returned an empty reply");
                    metrics::record_provider_error(name, "empty_response");
                    return None;
                }
                tracing::info!(provider = name, reply_len = text.len(), "Provider replied");
                Some(text.to_string())
            }
            Err(e) => {
                tracing::warn!(provider = name, error = %e, "Provider stage failed, falling back");
                metrics::record_provider_error(name, e.kind());
                None
            }
        }
    }
}
