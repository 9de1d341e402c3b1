//! Phrase loading against a local HTTP server.

use absurd_game::services::phrase_source::{HttpPhraseSource, LoadError, PhraseSource};
use absurd_game::services::session::{CursorPolicy, PhraseSession};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KIDS: [&str; 3] = ["Жираф в шарфе 🦒", "Кот-летчик 🐱", "Слон за ромашкой 🐘"];

async fn source(server: &MockServer) -> HttpPhraseSource {
    HttpPhraseSource::new(&format!("{}/data/", server.uri()), Duration::from_secs(5)).unwrap()
}

async fn serve_kids(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/kids.json"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(KIDS))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetches_genre_file_without_cache() {
    let server = MockServer::start().await;
    serve_kids(&server).await;

    let list = source(&server).await.fetch("kids").await.unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list.get(0), Some(KIDS[0]));
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = source(&server).await.fetch("horror").await.unwrap_err();
    assert_eq!(err, LoadError::NotFound("horror".to_string()));
}

#[tokio::test]
async fn server_error_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = source(&server).await.fetch("kids").await.unwrap_err();
    assert!(matches!(err, LoadError::Transport(_)));
}

#[tokio::test]
async fn malformed_bodies_are_bad_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/absurd.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/street.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/romance.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<String>::new()))
        .mount(&server)
        .await;

    let source = source(&server).await;
    for genre in ["absurd", "street", "romance"] {
        let err = source.fetch(genre).await.unwrap_err();
        assert!(matches!(err, LoadError::BadFormat(_)), "{genre}: {err:?}");
    }
}

#[tokio::test]
async fn session_cycles_through_loaded_genre() {
    let server = MockServer::start().await;
    serve_kids(&server).await;
    let source = source(&server).await;

    let mut session = PhraseSession::with_seed(CursorPolicy::Shuffle, 42);
    let loaded = session.load_genre(&source, "kids").await.unwrap();
    assert_eq!(loaded.len(), 3);

    let mut seen = HashSet::new();
    for _ in 0..100 {
        let phrase = session.next().unwrap().to_string();
        assert!(KIDS.contains(&phrase.as_str()));
        seen.insert(phrase);
    }
    assert_eq!(seen.len(), 3);
    assert_eq!(session.shown_count(), 100);
}

#[tokio::test]
async fn failed_load_keeps_previous_genre() {
    let server = MockServer::start().await;
    serve_kids(&server).await;
    Mock::given(method("GET"))
        .and(path("/data/horror.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let source = source(&server).await;

    let mut session = PhraseSession::new(CursorPolicy::Sequential);
    session.load_genre(&source, "kids").await.unwrap();
    assert!(session.load_genre(&source, "horror").await.is_err());

    assert_eq!(session.active_genre().map(|g| g.id), Some("kids"));
    assert_eq!(session.next(), Some(KIDS[0]));
}
