// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Digit prediction API endpoint module
//!
//! Provides POST /predict and POST /predict-canvas.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{predict_canvas_handler, predict_handler};
pub use request::ImageUpload;
pub use response::PredictResponse;
