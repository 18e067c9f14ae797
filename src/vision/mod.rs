// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for handwritten digit classification
//!
//! This module provides:
//! - Image decoding with magic-byte format detection
//! - Normalization to the 28x28 grayscale model input
//! - The model runtime that turns a tensor into a digit
//!
//! Inference runs on CPU only.

pub mod image_utils;
pub mod model;
pub mod preprocessing;

pub use image_utils::{
    decode_image_bytes, decode_image_bytes_with_limit, detect_format, ImageError, ImageInfo,
    MAX_IMAGE_SIZE,
};
pub use model::{
    argmax, Digit, DigitModel, InferenceError, ModelRuntime, OnnxDigitModel, StartupError,
    NUM_CLASSES,
};
pub use preprocessing::{normalize, preprocess_bytes, NormalizedTensor, INPUT_SIZE};
