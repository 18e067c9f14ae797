// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat endpoint handler

use axum::{extract::State, Form, Json};
use tracing::{info, warn};

use super::request::ChatRequest;
use super::response::ChatResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::server::AppState;

/// POST /chat - Generate a reply (and speech) for the user's message
///
/// # Request
/// Form-encoded `user_input`.
///
/// # Errors
/// - 400 Bad Request: empty input
/// - 503 Service Unavailable: no assistant configured
/// - 500 Internal Server Error: generation failed
pub async fn chat_handler(
    State(state): State<AppState>,
    Form(request): Form<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiErrorResponse> {
    if let Err(e) = request.validate() {
        warn!("Chat validation failed: {}", e);
        return Err(e.into());
    }

    let assistant = state.chat.as_ref().ok_or_else(|| {
        warn!("Chat service not available");
        ApiError::ServiceUnavailable("Chat service not available".to_string())
    })?;

    let reply = assistant.reply(&request.user_input).await.map_err(|e| {
        warn!("Chat failed: {}", e);
        ApiError::from(e)
    })?;

    info!(
        "Chat reply: {} chars, audio: {}",
        reply.response.len(),
        reply.audio_path.is_some()
    );

    Ok(Json(ChatResponse::new(request.user_input, reply)))
}
