// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::chat::ChatError;
use crate::pipeline::{ClassifyError, ErrorKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    ValidationError { field: String, message: String },
    ImageDecodeError(String),
    StorageError(String),
    InferenceError(String),
    PayloadTooLarge(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                (ErrorKind::ValidationError.as_str(), message.clone(), Some(details))
            }
            ApiError::ImageDecodeError(msg) => (ErrorKind::ImageDecodeError.as_str(), msg.clone(), None),
            ApiError::StorageError(msg) => (ErrorKind::StorageError.as_str(), msg.clone(), None),
            ApiError::InferenceError(msg) => (ErrorKind::InferenceError.as_str(), msg.clone(), None),
            ApiError::PayloadTooLarge(msg) => ("payload_too_large", msg.clone(), None),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } | ApiError::ImageDecodeError(_) => 400,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::StorageError(_) | ApiError::InferenceError(_) | ApiError::InternalError(_) => {
                500
            }
        }
    }

    /// Attach the request id that will be echoed in the error body
    pub fn with_request_id(self, request_id: impl ToString) -> ApiErrorResponse {
        ApiErrorResponse {
            error: self,
            request_id: Some(request_id.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::ImageDecodeError(msg) => write!(f, "Image decode error: {}", msg),
            ApiError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            ApiError::InferenceError(msg) => write!(f, "Inference error: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Validation(message) => ApiError::ValidationError {
                field: "file".to_string(),
                message,
            },
            ClassifyError::ImageDecode(e) => ApiError::ImageDecodeError(e.to_string()),
            ClassifyError::Storage(e) => ApiError::StorageError(e.to_string()),
            ClassifyError::Inference(e) => ApiError::InferenceError(e.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyInput => ApiError::ValidationError {
                field: "user_input".to_string(),
                message: "Input cannot be empty.".to_string(),
            },
            other => ApiError::InternalError(format!("Chatbot error: {}", other)),
        }
    }
}

/// Error wrapper that renders an `ErrorResponse` with its HTTP status
#[derive(Debug)]
pub struct ApiErrorResponse {
    pub error: ApiError,
    pub request_id: Option<String>,
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        Self {
            error,
            request_id: None,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.error.to_response(self.request_id);

        (status, Json(body)).into_response()
    }
}
