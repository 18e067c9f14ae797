// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict endpoint handlers

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, warn};
use uuid::Uuid;

use super::request::ImageUpload;
use super::response::PredictResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::server::AppState;
use crate::pipeline::{Submission, SubmissionSource};

/// POST /predict - Classify an uploaded image
///
/// # Request
/// Multipart form with a `file` part holding the image bytes.
///
/// # Response
/// - `prediction`: Predicted digit (0-9)
///
/// # Errors
/// - 400 Bad Request: `file` part missing (validation_error) or undecodable (image_decode_error)
/// - 500 Internal Server Error: staging or inference failed
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiErrorResponse> {
    classify_multipart(state, multipart, SubmissionSource::Upload).await
}

/// POST /predict-canvas - Classify a drawing captured from the canvas
///
/// Same contract as `/predict`.
pub async fn predict_canvas_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiErrorResponse> {
    classify_multipart(state, multipart, SubmissionSource::Canvas).await
}

async fn classify_multipart(
    state: AppState,
    mut multipart: Multipart,
    source: SubmissionSource,
) -> Result<Json<PredictResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4();
    debug!("[{}] {} request received", request_id, source);

    let upload = ImageUpload::from_multipart(&mut multipart)
        .await
        .map_err(|e| {
            warn!("[{}] {} validation failed: {}", request_id, source, e);
            e.with_request_id(request_id)
        })?;

    let submission = Submission {
        source,
        filename: upload.filename,
        bytes: upload.bytes,
    };

    // Staging and scoring block, keep them off the async workers
    let pipeline = state.pipeline.clone();
    let digit = tokio::task::spawn_blocking(move || pipeline.run(request_id, submission))
        .await
        .map_err(|e| {
            ApiError::InternalError(format!("Classification task failed: {}", e))
                .with_request_id(request_id)
        })?
        .map_err(|e| ApiError::from(e).with_request_id(request_id))?;

    Ok(Json(PredictResponse::new(digit)))
}
