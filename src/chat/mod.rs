// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversational assistant collaborator
//!
//! Text generation and speech synthesis are external services. This module
//! only fixes their contracts and composes them: user text goes to a
//! [`ChatService`], the reply goes to a [`SpeechSynthesizer`], and the caller
//! gets the reply text plus the path of the synthesized audio.

pub mod openai;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

pub use openai::{OpenAiChatClient, OpenAiSpeechClient};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Input cannot be empty")]
    EmptyInput,

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}

/// External text-generation service
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn complete(&self, user_input: &str) -> Result<String, ChatError>;
}

/// External speech-synthesis service, returns the written audio file
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, ChatError>;
}

/// Reply to one chat turn
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    /// Absent when no synthesizer is configured or synthesis failed
    pub audio_path: Option<PathBuf>,
}

/// Text generation with optional speech output
#[derive(Clone)]
pub struct ChatAssistant {
    service: Arc<dyn ChatService>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
}

impl ChatAssistant {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        Self {
            service,
            speech: None,
        }
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub async fn reply(&self, user_input: &str) -> Result<ChatReply, ChatError> {
        let user_input = user_input.trim();
        if user_input.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let response = self.service.complete(user_input).await?;
        debug!("Chat reply generated: {} chars", response.len());

        let audio_path = match &self.speech {
            Some(speech) => match speech.synthesize(&response).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Speech synthesis failed, replying without audio: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(ChatReply {
            response,
            audio_path,
        })
    }
}
