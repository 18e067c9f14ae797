// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::chat::{chat_handler, AUDIO_URL_PREFIX};
use super::handlers::health_handler;
use super::predict::{predict_canvas_handler, predict_handler};
use crate::chat::ChatAssistant;
use crate::pipeline::ClassificationPipeline;

/// Room for multipart boundaries and part headers on top of the image itself
const MULTIPART_OVERHEAD_BYTES: usize = 16 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClassificationPipeline>,
    pub chat: Option<ChatAssistant>,
    /// Directory published under `/audio`
    pub audio_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(pipeline: ClassificationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            chat: None,
            audio_dir: None,
        }
    }

    pub fn with_chat(mut self, chat: ChatAssistant) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_audio_dir(mut self, audio_dir: impl Into<PathBuf>) -> Self {
        self.audio_dir = Some(audio_dir.into());
        self
    }
}

/// Build the HTTP router
///
/// The request body limit follows the pipeline's image limit, so an image the
/// decoder would accept is never cut off by the transport.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .pipeline
        .max_image_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/predict-canvas", post(predict_canvas_handler))
        .route("/chat", post(chat_handler));

    if let Some(audio_dir) = &state.audio_dir {
        info!("Serving synthesized audio from {}", audio_dir.display());
        router = router.nest_service(AUDIO_URL_PREFIX, ServeDir::new(audio_dir));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `router` on `addr` until ctrl-c
pub async fn start_server(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
