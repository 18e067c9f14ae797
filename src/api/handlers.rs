// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
    pub build: String,
    pub features: Vec<String>,
    /// Files currently sitting in the staging directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged_files: Option<usize>,
    pub chat_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut issues = Vec::new();

    let staged_files = match state.pipeline.staging().staged_count() {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Staging directory unreadable: {}", e);
            issues.push(format!("staging directory unreadable: {}", e));
            None
        }
    };

    Json(HealthResponse {
        status: if issues.is_empty() { "healthy" } else { "degraded" }.to_string(),
        model: state.pipeline.runtime().model_name().to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
        build: crate::version::VERSION.to_string(),
        features: crate::version::FEATURES.iter().map(|f| f.to_string()).collect(),
        staged_files,
        chat_enabled: state.chat.is_some(),
        issues: if issues.is_empty() { None } else { Some(issues) },
    })
}
