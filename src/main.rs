// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use bitpen::{
    api::{create_router, start_server, AppState},
    chat::{ChatAssistant, OpenAiChatClient, OpenAiSpeechClient},
    config::NodeConfig,
    pipeline::ClassificationPipeline,
    staging::StagingArea,
    version,
    vision::{ModelRuntime, OnnxDigitModel},
};
use clap::Parser;
use std::{env, sync::Arc};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("{}", version::get_version_string());
    info!("Build: {} [{}]", version::VERSION, version::FEATURES.join(", "));

    let config = NodeConfig::parse();
    config.validate()?;

    let staging = StagingArea::open(&config.staging_dir)
        .with_context(|| format!("Failed to prepare staging area {}", config.staging_dir.display()))?;
    info!("Staging uploads in {}", staging.dir().display());

    // The server never binds without a working model
    let model = match OnnxDigitModel::load(&config.model_path, config.intra_threads) {
        Ok(model) => model,
        Err(e) => {
            error!("Model failed to load: {}", e);
            return Err(e).context("Cannot start without a classification model");
        }
    };
    info!("Model ready: {}", model.path().display());

    let pipeline = ClassificationPipeline::new(staging, ModelRuntime::from_model(model))
        .with_max_image_bytes(config.max_upload_bytes);
    let mut state = AppState::new(pipeline);

    match &config.chat_endpoint {
        Some(endpoint) => {
            let chat = OpenAiChatClient::new(
                endpoint,
                &config.chat_model,
                config.chat_api_key.clone(),
            )?;
            let mut assistant = ChatAssistant::new(Arc::new(chat));

            if let Some(speech_model) = &config.speech_model {
                let speech = OpenAiSpeechClient::new(
                    endpoint,
                    speech_model,
                    &config.speech_voice,
                    config.chat_api_key.clone(),
                    &config.audio_dir,
                )?;
                assistant = assistant.with_speech(Arc::new(speech));
                state = state.with_audio_dir(&config.audio_dir);
            }

            state = state.with_chat(assistant);
        }
        None => info!("No chat endpoint configured, /chat is disabled"),
    }

    start_server(config.listen_addr, create_router(state)).await
}
