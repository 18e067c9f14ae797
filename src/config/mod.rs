// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every flag can also be supplied through its `BITPEN_*` environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

/// Default upload limit (10MB), matches the decoder's own ceiling
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// BitPen handwriting classification node
#[derive(Parser, Debug, Clone)]
#[command(name = "bitpen-node")]
#[command(version)]
#[command(about = "Serves handwritten digit classification over HTTP", long_about = None)]
pub struct NodeConfig {
    /// Address the HTTP server binds to
    #[arg(long, env = "BITPEN_LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: SocketAddr,

    /// Path to the ONNX export of the handwriting model
    #[arg(
        long,
        env = "BITPEN_MODEL_PATH",
        default_value = "./model/handwritten_model.onnx"
    )]
    pub model_path: PathBuf,

    /// Directory used to stage uploads before decoding
    #[arg(long, env = "BITPEN_STAGING_DIR", default_value = "./temp")]
    pub staging_dir: PathBuf,

    /// ONNX Runtime intra-op thread count
    #[arg(long, env = "BITPEN_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Largest image accepted, both on the wire and by the decoder
    #[arg(long, env = "BITPEN_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Base URL of an OpenAI-compatible API; enables /chat when set
    #[arg(long, env = "BITPEN_CHAT_ENDPOINT")]
    pub chat_endpoint: Option<String>,

    /// Chat completion model
    #[arg(long, env = "BITPEN_CHAT_MODEL", default_value = "gpt-4")]
    pub chat_model: String,

    /// Bearer token for the chat and speech API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub chat_api_key: Option<String>,

    /// Text-to-speech model; replies get audio when set
    #[arg(long, env = "BITPEN_SPEECH_MODEL")]
    pub speech_model: Option<String>,

    /// Text-to-speech voice
    #[arg(long, env = "BITPEN_SPEECH_VOICE", default_value = "alloy")]
    pub speech_voice: String,

    /// Directory synthesized replies are written to and served from
    #[arg(long, env = "BITPEN_AUDIO_DIR", default_value = "./audio")]
    pub audio_dir: PathBuf,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.intra_threads == 0 {
            return Err(anyhow!("intra_threads must be greater than 0"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be greater than 0"));
        }
        if self.staging_dir.as_os_str().is_empty() {
            return Err(anyhow!("staging_dir must not be empty"));
        }
        if self.speech_model.is_some() && self.chat_endpoint.is_none() {
            return Err(anyhow!("speech_model requires chat_endpoint"));
        }
        Ok(())
    }
}
