//! Mock provider implementations for testing.

use super::{ProviderError, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock text provider that replays scripted outcomes.
///
/// Once the script runs out, the last outcome repeats.
pub struct MockTextProvider {
    name: String,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    last: Mutex<Option<Result<String, ProviderError>>>,
    calls: AtomicUsize,
}

impl MockTextProvider {
    pub fn new<I>(name: &str, script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ProviderError>>,
    {
        Self {
            name: name.to_string(),
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always replies with `text`.
    pub fn replying(name: &str, text: &str) -> Self {
        Self::new(name, [Ok(text.to_string())])
    }

    /// Always fails with `error`.
    pub fn failing(name: &str, error: ProviderError) -> Self {
        Self::new(name, [Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .script
            .lock()
            .map_err(|_| ProviderError::NotConfigured("mock script poisoned".to_string()))?
            .pop_front();

        let mut last = self
            .last
            .lock()
            .map_err(|_| ProviderError::NotConfigured("mock script poisoned".to_string()))?;

        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last.clone().unwrap_or_else(|| {
                Err(ProviderError::NotConfigured(
                    "Mock text provider has no script".to_string(),
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_repeat_last() {
        let provider = MockTextProvider::new(
            "mock",
            [Err(ProviderError::RateLimited), Ok("ok".to_string())],
        );

        assert_eq!(provider.generate("x").await, Err(ProviderError::RateLimited));
        assert_eq!(provider.generate("x").await, Ok("ok".to_string()));
        assert_eq!(provider.generate("x").await, Ok("ok".to_string()));
        assert_eq!(provider.calls(), 3);
    }
}
