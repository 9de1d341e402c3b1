//! Phrase session: the active genre and the cursor into its phrases.

use crate::models::Genre;
use crate::services::phrase_source::{LoadError, PhraseList, PhraseSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// How `next()` picks the following phrase. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorPolicy {
    /// Walk the list in order, wrapping around at the end.
    Sequential,
    /// Pick a uniformly random phrase on every call.
    #[default]
    Shuffle,
}

pub struct PhraseSession {
    policy: CursorPolicy,
    rng: StdRng,
    active_genre: Option<&'static Genre>,
    phrases: Option<PhraseList>,
    cursor: usize,
    // Sequential mode hands out index 0 before the cursor starts moving.
    fresh: bool,
    shown_count: u64,
}

impl PhraseSession {
    pub fn new(policy: CursorPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    /// Deterministic shuffle order, for tests and replays.
    pub fn with_seed(policy: CursorPolicy, seed: u64) -> Self {
        Self::with_rng(policy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(policy: CursorPolicy, rng: StdRng) -> Self {
        Self {
            policy,
            rng,
            active_genre: None,
            phrases: None,
            cursor: 0,
            fresh: false,
            shown_count: 0,
        }
    }

    /// Load phrases for `genre_id` and make it the active genre.
    ///
    /// On failure the session keeps whatever it had before.
    pub async fn load_genre(
        &mut self,
        source: &dyn PhraseSource,
        genre_id: &str,
    ) -> Result<&PhraseList, LoadError> {
        let genre =
            Genre::find(genre_id).ok_or_else(|| LoadError::UnknownGenre(genre_id.to_string()))?;

        let phrases = source.fetch(genre.id).await?;

        tracing::info!(genre = genre.id, count = phrases.len(), "Genre loaded");

        self.active_genre = Some(genre);
        self.cursor = 0;
        self.fresh = true;
        Ok(self.phrases.insert(phrases))
    }

    /// Advance the cursor and return the phrase under it, or `None` when no
    /// genre is loaded.
    pub fn next(&mut self) -> Option<&str> {
        let phrases = self.phrases.as_ref()?;
        let len = phrases.len();

        self.cursor = match self.policy {
            CursorPolicy::Sequential if self.fresh => 0,
            CursorPolicy::Sequential => (self.cursor + 1) % len,
            CursorPolicy::Shuffle => self.rng.gen_range(0..len),
        };
        self.fresh = false;
        self.shown_count += 1;

        phrases.get(self.cursor)
    }

    /// The phrase under the cursor without advancing.
    pub fn current(&self) -> Option<&str> {
        self.phrases.as_ref()?.get(self.cursor)
    }

    /// Drop the active genre. `shown_count` survives.
    pub fn reset(&mut self) {
        self.active_genre = None;
        self.phrases = None;
        self.cursor = 0;
        self.fresh = false;
    }

    pub fn active_genre(&self) -> Option<&'static Genre> {
        self.active_genre
    }

    pub fn phrases(&self) -> Option<&PhraseList> {
        self.phrases.as_ref()
    }

    pub fn shown_count(&self) -> u64 {
        self.shown_count
    }

    pub fn policy(&self) -> CursorPolicy {
        self.policy
    }
}
