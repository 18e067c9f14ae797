// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible chat and speech clients

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ChatError, ChatService, SpeechSynthesizer};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI assistant that helps users.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(serde::Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(serde::Deserialize)]
struct CompletionChoice {
    message: CompletionResponseMessage,
}

#[derive(serde::Deserialize)]
struct CompletionResponseMessage {
    content: String,
}

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

fn authorize(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

/// Text generation through `/v1/chat/completions`
pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    model_name: String,
    api_key: Option<String>,
    system_prompt: String,
}

impl OpenAiChatClient {
    pub fn new(endpoint: &str, model_name: &str, api_key: Option<String>) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Chat client configured: endpoint={}, model={}",
            endpoint, model_name
        );

        Ok(Self {
            client: build_client()?,
            endpoint,
            model_name: model_name.to_string(),
            api_key,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn request_completion(&self, user_input: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model_name,
            messages: vec![
                CompletionMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                CompletionMessage {
                    role: "user",
                    content: user_input,
                },
            ],
        };

        let response = authorize(
            self.client
                .post(format!("{}/v1/chat/completions", self.endpoint)),
            self.api_key.as_deref(),
        )
        .json(&request)
        .send()
        .await
        .context("Chat completion request failed")?
        .error_for_status()
        .context("Chat completion service returned an error")?;

        let completion: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Chat completion response had no choices")
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn complete(&self, user_input: &str) -> Result<String, ChatError> {
        self.request_completion(user_input)
            .await
            .map_err(|e| ChatError::Generation(format!("{:#}", e)))
    }
}

/// Speech synthesis through `/v1/audio/speech`, written as MP3 files
pub struct OpenAiSpeechClient {
    client: Client,
    endpoint: String,
    model_name: String,
    voice: String,
    api_key: Option<String>,
    audio_dir: PathBuf,
}

impl OpenAiSpeechClient {
    /// Create the client and make sure `audio_dir` exists
    pub fn new(
        endpoint: &str,
        model_name: &str,
        voice: &str,
        api_key: Option<String>,
        audio_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let audio_dir = audio_dir.into();
        std::fs::create_dir_all(&audio_dir).with_context(|| {
            format!("Failed to create audio directory {}", audio_dir.display())
        })?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Speech client configured: endpoint={}, model={}, voice={}",
            endpoint, model_name, voice
        );

        Ok(Self {
            client: build_client()?,
            endpoint,
            model_name: model_name.to_string(),
            voice: voice.to_string(),
            api_key,
            audio_dir,
        })
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    async fn request_speech(&self, text: &str) -> Result<PathBuf> {
        let request = SpeechRequest {
            model: &self.model_name,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
        };

        let audio = authorize(
            self.client
                .post(format!("{}/v1/audio/speech", self.endpoint)),
            self.api_key.as_deref(),
        )
        .json(&request)
        .send()
        .await
        .context("Speech request failed")?
        .error_for_status()
        .context("Speech service returned an error")?
        .bytes()
        .await
        .context("Failed to read speech audio")?;

        let path = self
            .audio_dir
            .join(format!("response_audio_{}.mp3", Uuid::new_v4().simple()));
        tokio::fs::write(&path, &audio)
            .await
            .with_context(|| format!("Failed to write audio file {}", path.display()))?;

        debug!("Wrote {} bytes of speech to {}", audio.len(), path.display());
        Ok(path)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, ChatError> {
        self.request_speech(text)
            .await
            .map_err(|e| ChatError::Synthesis(format!("{:#}", e)))
    }
}
