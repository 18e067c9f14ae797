// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Form body for POST /chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_input: String,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.user_input.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "user_input".to_string(),
                message: "Input cannot be empty.".to_string(),
            });
        }
        Ok(())
    }
}
