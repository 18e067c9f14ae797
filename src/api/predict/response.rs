// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict response types

use serde::{Deserialize, Serialize};

use crate::vision::Digit;

/// Response from digit classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predicted digit (0-9)
    pub prediction: u8,
}

impl PredictResponse {
    pub fn new(digit: Digit) -> Self {
        Self {
            prediction: digit.value(),
        }
    }
}
