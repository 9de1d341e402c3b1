//! Reply pipeline against mocked Gemini and OpenAI-compatible endpoints.

use absurd_game::services::pipeline::{ProviderStage, ReplySource, ResponsePipeline};
use absurd_game::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use absurd_game::services::providers::openai::{OpenAiConfig, OpenAiTextProvider};
use absurd_game::services::providers::{GenerationParams, DEFAULT_INSTRUCTION};
use absurd_game::services::responder::Category;
use game_core::retry::RetryConfig;
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/v1beta/models/gemini-test:generateContent";
const OPENAI_PATH: &str = "/v1/chat/completions";

fn gemini(server: &MockServer) -> Arc<GeminiTextProvider> {
    Arc::new(
        GeminiTextProvider::new(GeminiConfig {
            base_url: format!("{}/v1beta", server.uri()),
            api_key: SecretString::new("gemini-key".to_string()),
            model: "gemini-test".to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            params: GenerationParams::default(),
            timeout: Duration::from_secs(5),
        })
        .unwrap(),
    )
}

fn openai(server: &MockServer) -> Arc<OpenAiTextProvider> {
    Arc::new(
        OpenAiTextProvider::new(OpenAiConfig {
            base_url: format!("{}/v1", server.uri()),
            api_key: SecretString::new("openai-key".to_string()),
            model: "gpt-test".to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            params: GenerationParams::default(),
            timeout: Duration::from_secs(5),
        })
        .unwrap(),
    )
}

fn quick(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        ..RetryConfig::quick()
    }
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn primary_reply_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "gemini-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "maxOutputTokens": 100 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(" Банан в космосе! 🍌 ")))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = ResponsePipeline::new(vec![
        ProviderStage::new(gemini(&server), quick(3)),
        ProviderStage::new(openai(&server), quick(1)),
    ]);

    let reply = pipeline.reply("расскажи анекдот").await;
    assert_eq!(reply.text, "Банан в космосе! 🍌");
    assert_eq!(reply.source, ReplySource::Provider("gemini".to_string()));
}

#[tokio::test]
async fn secondary_answers_after_primary_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(header("authorization", "Bearer openai-key"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "messages": [
                { "role": "system", "content": DEFAULT_INSTRUCTION },
                { "role": "user", "content": "как дела?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": { "role": "assistant", "content": "Как у огурца на дискотеке 🥒" },
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = ResponsePipeline::new(vec![
        ProviderStage::new(gemini(&server), quick(3)),
        ProviderStage::new(openai(&server), quick(1)),
    ]);

    let reply = pipeline.reply("как дела?").await;
    assert_eq!(reply.text, "Как у огурца на дискотеке 🥒");
    assert_eq!(reply.source.label(), "openai");
}

#[tokio::test]
async fn everything_down_falls_back_to_local_greeting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = ResponsePipeline::new(vec![
        ProviderStage::new(gemini(&server), quick(3)),
        ProviderStage::new(openai(&server), quick(1)),
    ]);

    let reply = pipeline.reply("привет").await;
    assert_eq!(reply.source, ReplySource::Local);
    assert!(Category::Greeting.replies().contains(&reply.text.as_str()));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = ResponsePipeline::new(vec![ProviderStage::new(gemini(&server), quick(3))]);

    let reply = pipeline.reply("спасибо").await;
    assert_eq!(reply.source, ReplySource::Local);
    assert!(Category::Thanks.replies().contains(&reply.text.as_str()));
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Второй раз повезло 🍀")))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = ResponsePipeline::new(vec![ProviderStage::new(gemini(&server), quick(3))]);

    assert_eq!(pipeline.get_reply("hi").await, "Второй раз повезло 🍀");
}

#[tokio::test]
async fn filtered_and_empty_replies_fall_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "   " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = ResponsePipeline::new(vec![
        ProviderStage::new(gemini(&server), quick(3)),
        ProviderStage::new(openai(&server), quick(3)),
    ]);

    let reply = pipeline.reply("почему небо голубое?").await;
    assert_eq!(reply.source, ReplySource::Local);
    assert!(Category::Why.replies().contains(&reply.text.as_str()));
}
