// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload parsing for the predict endpoints

use axum::http::StatusCode;
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;
use bytes::Bytes;

use crate::api::errors::ApiError;

/// Multipart field that carries the image
pub const FILE_FIELD: &str = "file";

/// Filename used when the part carries none
const DEFAULT_FILENAME: &str = "upload";

/// The image part of a predict request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Pull the `file` part out of a multipart body
    ///
    /// Other parts are skipped. A body without a `file` part is a
    /// validation error; a `file` part with zero bytes is accepted here and
    /// rejected later by the decoder.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ApiError> {
        while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let filename = field
                .file_name()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(DEFAULT_FILENAME)
                .to_string();
            let bytes = field.bytes().await.map_err(invalid_body)?;

            return Ok(Self { filename, bytes });
        }

        Err(ApiError::ValidationError {
            field: FILE_FIELD.to_string(),
            message: "file is required".to_string(),
        })
    }
}

fn invalid_body(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge(format!("upload exceeds the size limit: {}", err));
    }
    ApiError::ValidationError {
        field: FILE_FIELD.to_string(),
        message: format!("invalid multipart body: {}", err),
    }
}
