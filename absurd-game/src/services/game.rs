//! Game controller: glues the phrase session, the chat transcript and the
//! reply pipeline together for a presentation layer.
//!
//! Every method takes `&self`; re-entrant clicks are refused through busy
//! flags instead of queuing or cancelling work.

use crate::models::{ChatEntry, ChatTranscript, Genre};
use crate::services::metrics;
use crate::services::phrase_source::{LoadError, PhraseSource};
use crate::services::pipeline::ResponsePipeline;
use crate::services::session::{CursorPolicy, PhraseSession};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub const WELCOME_MESSAGE: &str = "Привет! Я Абсурд-бот 🤖 Задай мне что-нибудь странное!";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Another action is still in progress")]
    Busy,

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Result of a successful genre selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreSelection {
    pub genre: &'static Genre,
    pub phrase_count: usize,
    pub first_phrase: Option<String>,
}

/// Set while an action runs; cleared when the guard drops.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Game {
    session: tokio::sync::Mutex<PhraseSession>,
    transcript: Mutex<ChatTranscript>,
    source: Arc<dyn PhraseSource>,
    pipeline: ResponsePipeline,
    loading: AtomicBool,
    replying: AtomicBool,
}

impl Game {
    pub fn new(
        session: PhraseSession,
        transcript: ChatTranscript,
        source: Arc<dyn PhraseSource>,
        pipeline: ResponsePipeline,
    ) -> Self {
        Self {
            session: tokio::sync::Mutex::new(session),
            transcript: Mutex::new(transcript),
            source,
            pipeline,
            loading: AtomicBool::new(false),
            replying: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Number of remote stages in front of the local responder.
    pub fn provider_count(&self) -> usize {
        self.pipeline.stages().len()
    }

    /// Load a genre and hand out its first phrase.
    pub async fn select_genre(&self, genre_id: &str) -> Result<GenreSelection, GameError> {
        let _busy = BusyGuard::try_acquire(&self.loading).ok_or(GameError::Busy)?;

        let mut session = self.session.lock().await;
        let loaded = session
            .load_genre(self.source.as_ref(), genre_id)
            .await
            .map(|list| list.len());

        let phrase_count = match loaded {
            Ok(count) => {
                metrics::record_phrase_load(genre_id, "ok");
                count
            }
            Err(e) => {
                tracing::warn!(genre = genre_id, error = %e, "Failed to load genre");
                metrics::record_phrase_load(genre_id, e.kind());
                return Err(e.into());
            }
        };

        let genre = session
            .active_genre()
            .ok_or_else(|| LoadError::UnknownGenre(genre_id.to_string()))?;
        let first_phrase = session.next().map(str::to_string);

        Ok(GenreSelection {
            genre,
            phrase_count,
            first_phrase,
        })
    }

    /// Next phrase of the active genre; `None` when no genre is loaded.
    pub async fn next_phrase(&self) -> Option<String> {
        self.session.lock().await.next().map(str::to_string)
    }

    pub async fn back_to_genres(&self) {
        self.session.lock().await.reset();
    }

    pub async fn active_genre(&self) -> Option<&'static Genre> {
        self.session.lock().await.active_genre()
    }

    pub async fn shown_count(&self) -> u64 {
        self.session.lock().await.shown_count()
    }

    pub async fn cursor_policy(&self) -> CursorPolicy {
        self.session.lock().await.policy()
    }

    pub fn transcript_capacity(&self) -> usize {
        self.transcript().capacity()
    }

    /// Post the bot's greeting into the transcript.
    pub fn welcome(&self) {
        self.transcript().push_bot(WELCOME_MESSAGE);
    }

    /// Send a chat message and return the bot's reply.
    ///
    /// Blank input, input while a genre is loading and input while another
    /// reply is pending are ignored and yield `None`.
    pub async fn send_chat(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || self.is_loading() {
            return None;
        }
        let _busy = BusyGuard::try_acquire(&self.replying)?;

        self.transcript().push_user(text);
        let reply = self.pipeline.get_reply(text).await;
        self.transcript().push_bot(reply.clone());

        Some(reply)
    }

    pub fn chat_history(&self) -> Vec<ChatEntry> {
        self.transcript().entries().cloned().collect()
    }

    fn transcript(&self) -> MutexGuard<'_, ChatTranscript> {
        // A panic while holding the lock cannot leave a half-pushed entry.
        self.transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
