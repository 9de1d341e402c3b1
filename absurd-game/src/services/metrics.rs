//! Prometheus metrics for the absurd game.
//!
//! Records which pipeline stage answered each chat message, provider failures
//! and phrase load outcomes. Recording before `init_metrics` is a no-op.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

struct Metrics {
    registry: Registry,
    chat_replies: IntCounterVec,
    provider_errors: IntCounterVec,
    provider_latency: HistogramVec,
    phrase_loads: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let chat_replies = IntCounterVec::new(
            Opts::new("chat_replies_total", "Chat replies by producing stage"),
            &["stage"],
        )?;

        let provider_errors = IntCounterVec::new(
            Opts::new("provider_errors_total", "Failed provider attempts"),
            &["provider", "error_type"],
        )?;

        let provider_latency = HistogramVec::new(
            HistogramOpts::new(
                "provider_latency_seconds",
                "Provider stage latency in seconds, retries included",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
            &["provider"],
        )?;

        let phrase_loads = IntCounterVec::new(
            Opts::new("phrase_loads_total", "Genre loads by outcome"),
            &["genre", "outcome"],
        )?;

        registry.register(Box::new(chat_replies.clone()))?;
        registry.register(Box::new(provider_errors.clone()))?;
        registry.register(Box::new(provider_latency.clone()))?;
        registry.register(Box::new(phrase_loads.clone()))?;

        Ok(Self {
            registry,
            chat_replies,
            provider_errors,
            provider_latency,
            phrase_loads,
        })
    }
}

/// Initialize all metrics. Safe to call more than once; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }
    let metrics = Metrics::new()?;
    let _ = METRICS.set(metrics);
    Ok(())
}

pub fn record_chat_reply(stage: &str) {
    if let Some(m) = METRICS.get() {
        m.chat_replies.with_label_values(&[stage]).inc();
    }
}

pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.provider_errors
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

pub fn record_provider_latency(provider: &str, seconds: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency
            .with_label_values(&[provider])
            .observe(seconds);
    }
}

pub fn record_phrase_load(genre: &str, outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.phrase_loads.with_label_values(&[genre, outcome]).inc();
    }
}

/// Render all metrics in the Prometheus text format.
pub fn gather_metrics() -> String {
    let Some(m) = METRICS.get() else {
        return String::new();
    };

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&m.registry.gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
