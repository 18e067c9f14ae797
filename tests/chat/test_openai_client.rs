// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Chat and speech clients against a local OpenAI-compatible server

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use bitpen::chat::{
    ChatAssistant, ChatError, ChatService, OpenAiChatClient, OpenAiSpeechClient,
    SpeechSynthesizer,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

const API_KEY: &str = "sk-test";
const MP3_BYTES: &[u8] = b"ID3\x04\x00speech";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", API_KEY))
        .unwrap_or(false)
}

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    let reply = json!({
        "choices": [{ "message": { "role": "assistant", "content": format!("{} says {}", body["model"].as_str().unwrap_or_default(), user) } }]
    });
    (StatusCode::OK, Json(reply))
}

async fn speech(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Vec<u8>) {
    if !authorized(&headers) || body["response_format"] != "mp3" {
        return (StatusCode::BAD_REQUEST, Vec::new());
    }
    (StatusCode::OK, MP3_BYTES.to_vec())
}

async fn spawn_fake_api() -> SocketAddr {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .route("/v1/audio/speech", post(speech));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_chat_client_returns_completion() {
    let addr = spawn_fake_api().await;
    let client =
        OpenAiChatClient::new(&format!("http://{}/", addr), "gpt-4", Some(API_KEY.into()))
            .unwrap();

    let reply = client.complete("xin chao").await.unwrap();
    assert_eq!(reply, "gpt-4 says xin chao");
}

#[tokio::test]
async fn test_chat_client_surfaces_http_errors() {
    let addr = spawn_fake_api().await;
    let client = OpenAiChatClient::new(&format!("http://{}", addr), "gpt-4", None).unwrap();

    let err = client.complete("hello").await.unwrap_err();
    assert!(matches!(err, ChatError::Generation(ref msg) if msg.contains("401")), "{}", err);
}

#[tokio::test]
async fn test_speech_client_writes_mp3() {
    let addr = spawn_fake_api().await;
    let audio_dir = TempDir::new().unwrap();
    let client = OpenAiSpeechClient::new(
        &format!("http://{}", addr),
        "tts-1",
        "alloy",
        Some(API_KEY.into()),
        audio_dir.path(),
    )
    .unwrap();

    let path = client.synthesize("hello").await.unwrap();

    assert_eq!(path.parent(), Some(audio_dir.path()));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("response_audio_") && name.ends_with(".mp3"));
    assert_eq!(std::fs::read(&path).unwrap(), MP3_BYTES);
}

#[tokio::test]
async fn test_assistant_with_real_clients() {
    let addr = spawn_fake_api().await;
    let endpoint = format!("http://{}", addr);
    let audio_dir = TempDir::new().unwrap();

    let chat = OpenAiChatClient::new(&endpoint, "gpt-4", Some(API_KEY.into())).unwrap();
    let speech =
        OpenAiSpeechClient::new(&endpoint, "tts-1", "alloy", Some(API_KEY.into()), audio_dir.path())
            .unwrap();
    let assistant = ChatAssistant::new(Arc::new(chat)).with_speech(Arc::new(speech));

    let reply = assistant.reply("  hi  ").await.unwrap();
    assert_eq!(reply.response, "gpt-4 says hi");
    assert!(reply.audio_path.unwrap().exists());
}

#[tokio::test]
async fn test_speech_failure_keeps_text_reply() {
    let addr = spawn_fake_api().await;
    let endpoint = format!("http://{}", addr);
    let audio_dir = TempDir::new().unwrap();

    let chat = OpenAiChatClient::new(&endpoint, "gpt-4", Some(API_KEY.into())).unwrap();
    // No key: the speech call is rejected
    let speech =
        OpenAiSpeechClient::new(&endpoint, "tts-1", "alloy", None, audio_dir.path()).unwrap();
    let assistant = ChatAssistant::new(Arc::new(chat)).with_speech(Arc::new(speech));

    let reply = assistant.reply("hi").await.unwrap();
    assert_eq!(reply.response, "gpt-4 says hi");
    assert!(reply.audio_path.is_none());
    assert_eq!(std::fs::read_dir(audio_dir.path()).unwrap().count(), 0);
}
