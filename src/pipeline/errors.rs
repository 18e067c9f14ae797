// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-request classification errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::staging::StagingError;
use crate::vision::{ImageError, InferenceError};

/// Coarse error tag returned to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    ImageDecodeError,
    StorageError,
    InferenceError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::ImageDecodeError => "image_decode_error",
            ErrorKind::StorageError => "storage_error",
            ErrorKind::InferenceError => "inference_error",
        }
    }

    /// Whether the client caused the failure (4xx) rather than the server (5xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorKind::ValidationError | ErrorKind::ImageDecodeError)
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Image could not be decoded: {0}")]
    ImageDecode(#[from] ImageError),

    #[error("Staging failed: {0}")]
    Storage(#[from] StagingError),

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl ClassifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassifyError::Validation(_) => ErrorKind::ValidationError,
            ClassifyError::ImageDecode(_) => ErrorKind::ImageDecodeError,
            ClassifyError::Storage(_) => ErrorKind::StorageError,
            ClassifyError::Inference(_) => ErrorKind::InferenceError,
        }
    }
}
