// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bitpen::api::{create_router, AppState, HealthResponse};
use bitpen::pipeline::ClassificationPipeline;
use bitpen::staging::StagingArea;
use bitpen::vision::{DigitModel, InferenceError, ModelRuntime, NormalizedTensor, NUM_CLASSES};
use tempfile::TempDir;
use tower::ServiceExt;

struct Zero;

impl DigitModel for Zero {
    fn name(&self) -> &str {
        "handwritten_model"
    }

    fn scores(&self, _tensor: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
        Ok(vec![0.0; NUM_CLASSES])
    }
}

async fn get_health(staging: StagingArea) -> (StatusCode, HealthResponse) {
    let pipeline = ClassificationPipeline::new(staging, ModelRuntime::from_model(Zero));
    let app = create_router(AppState::new(pipeline));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_reports_model_and_staging() {
    let dir = TempDir::new().unwrap();
    let (status, health) = get_health(StagingArea::open(dir.path()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, "healthy");
    assert_eq!(health.model, "handwritten_model");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.build, bitpen::version::VERSION);
    assert!(health.features.iter().any(|f| f == "digit-canvas"));
    assert_eq!(health.staged_files, Some(0));
    assert!(!health.chat_enabled);
    assert!(health.issues.is_none());
}

#[tokio::test]
async fn test_health_degraded_when_staging_missing() {
    let dir = TempDir::new().unwrap();
    let (status, health) = get_health(StagingArea::new(dir.path().join("gone"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, "degraded");
    assert!(health.staged_files.is_none());
    assert_eq!(health.issues.map(|i| i.len()), Some(1));
}
