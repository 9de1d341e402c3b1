//! Phrase data sources.
//!
//! A source turns a genre id into a validated [`PhraseList`]. The game ships
//! with an HTTP source (`GET <base_url>/<genre>.json`), a directory source for
//! local play and an in-memory source for tests and embedding.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Error type for phrase loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Phrases not found for genre: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Bad phrase data: {0}")]
    BadFormat(String),
}

impl LoadError {
    /// Label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::UnknownGenre(_) => "unknown_genre",
            LoadError::NotFound(_) => "not_found",
            LoadError::Transport(_) => "transport",
            LoadError::BadFormat(_) => "bad_format",
        }
    }
}

/// Non-empty list of non-blank phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseList(Vec<String>);

impl PhraseList {
    /// Parse a JSON array of strings, dropping blank entries.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LoadError> {
        let raw: Vec<String> = serde_json::from_slice(bytes)
            .map_err(|e| LoadError::BadFormat(format!("expected a JSON array of strings: {e}")))?;
        Self::try_from(raw)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no phrases.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.0.iter().any(|p| p == phrase)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for PhraseList {
    type Error = LoadError;

    fn try_from(raw: Vec<String>) -> Result<Self, Self::Error> {
        if raw.is_empty() {
            return Err(LoadError::BadFormat("phrase list is empty".to_string()));
        }

        let phrases: Vec<String> = raw.into_iter().filter(|p| !p.trim().is_empty()).collect();

        if phrases.is_empty() {
            return Err(LoadError::BadFormat(
                "phrase list contains only blank entries".to_string(),
            ));
        }

        Ok(PhraseList(phrases))
    }
}

/// Trait for phrase providers keyed by genre id.
#[async_trait]
pub trait PhraseSource: Send + Sync {
    async fn fetch(&self, genre_id: &str) -> Result<PhraseList, LoadError>;
}

/// Fetches `<base_url>/<genre_id>.json` over HTTP, always revalidating.
pub struct HttpPhraseSource {
    base_url: String,
    client: Client,
}

impl HttpPhraseSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, genre_id: &str) -> String {
        format!("{}/{}.json", self.base_url, genre_id)
    }
}

#[async_trait]
impl PhraseSource for HttpPhraseSource {
    async fn fetch(&self, genre_id: &str) -> Result<PhraseList, LoadError> {
        let url = self.url_for(genre_id);
        tracing::debug!(genre = genre_id, url = %url, "Fetching phrases");

        let response = self
            .client
            .get(&url)
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound(genre_id.to_string()));
        }
        if !status.is_success() {
            return Err(LoadError::Transport(format!("HTTP {status} from {url}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        PhraseList::from_json(&body)
    }
}

/// Reads `<dir>/<genre_id>.json` from the local filesystem.
pub struct DirPhraseSource {
    dir: PathBuf,
}

impl DirPhraseSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PhraseSource for DirPhraseSource {
    async fn fetch(&self, genre_id: &str) -> Result<PhraseList, LoadError> {
        let path = self.dir.join(format!("{genre_id}.json"));
        tracing::debug!(genre = genre_id, path = %path.display(), "Reading phrases");

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(genre_id.to_string()),
            _ => LoadError::Transport(format!("{}: {e}", path.display())),
        })?;

        PhraseList::from_json(&bytes)
    }
}

/// In-memory phrases keyed by genre id. Entries are validated on fetch, so a
/// bad entry behaves like a bad file.
#[derive(Default)]
pub struct StaticPhraseSource {
    phrases: HashMap<String, Vec<String>>,
}

impl StaticPhraseSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genre<I, S>(mut self, genre_id: &str, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phrases.insert(
            genre_id.to_string(),
            phrases.into_iter().map(Into::into).collect(),
        );
        self
    }
}

#[async_trait]
impl PhraseSource for StaticPhraseSource {
    async fn fetch(&self, genre_id: &str) -> Result<PhraseList, LoadError> {
        let raw = self
            .phrases
            .get(genre_id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(genre_id.to_string()))?;
        PhraseList::try_from(raw)
    }
}
