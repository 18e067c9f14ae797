// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the digit classifier
//!
//! The network was trained on 28x28 single-channel images scaled to [0, 1].
//! Every upload is brought to exactly that shape, whatever its size or color
//! depth. Non-square images are stretched rather than cropped, matching how
//! the training data was prepared.

use image::imageops::{self, FilterType};
use image::DynamicImage;
use ndarray::{Array3, Array4, ArrayView3, Axis};

use super::image_utils::{decode_image_bytes, ImageError};

/// Side length of the model input
pub const INPUT_SIZE: u32 = 28;

/// Channels in the model input (grayscale)
pub const INPUT_CHANNELS: usize = 1;

/// Fixed resampling policy (bilinear)
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// A 28x28x1 grayscale tensor with every value in [0, 1]
///
/// Only [`normalize`] and [`NormalizedTensor::from_array`] construct one, so
/// holders can rely on the shape and range without re-checking.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array3<f32>);

impl NormalizedTensor {
    /// Shape as (height, width, channels)
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.0.view()
    }

    /// Copy into a batch of one in NHWC layout, `[1, 28, 28, 1]`
    pub fn to_batch(&self) -> Array4<f32> {
        self.0.clone().insert_axis(Axis(0))
    }

    /// Mean intensity over all samples
    pub fn mean(&self) -> f32 {
        self.0.mean().unwrap_or(0.0)
    }

    /// Wrap an existing array, rejecting the wrong shape or out-of-range values
    pub fn from_array(array: Array3<f32>) -> Option<Self> {
        let side = INPUT_SIZE as usize;
        if array.shape() != [side, side, INPUT_CHANNELS] {
            return None;
        }
        if !array.iter().all(|v| (0.0..=1.0).contains(v)) {
            return None;
        }
        Some(Self(array))
    }

    /// All-zero tensor, used to probe a freshly loaded model
    pub fn zeros() -> Self {
        let side = INPUT_SIZE as usize;
        Self(Array3::zeros((side, side, INPUT_CHANNELS)))
    }
}

/// Normalize a decoded image for classification
///
/// Steps:
/// 1. Collapse color channels to 8-bit luminance
/// 2. Resize to INPUT_SIZE x INPUT_SIZE with RESIZE_FILTER, ignoring aspect ratio
/// 3. Scale every sample by 1/255
pub fn normalize(image: &DynamicImage) -> NormalizedTensor {
    let gray = image.to_luma8();
    let resized = imageops::resize(&gray, INPUT_SIZE, INPUT_SIZE, RESIZE_FILTER);

    let side = INPUT_SIZE as usize;
    let tensor = Array3::from_shape_fn((side, side, INPUT_CHANNELS), |(y, x, _)| {
        resized.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
    });

    NormalizedTensor(tensor)
}

/// Decode raw bytes and normalize them in one step
pub fn preprocess_bytes(bytes: &[u8]) -> Result<NormalizedTensor, ImageError> {
    let (image, _info) = decode_image_bytes(bytes)?;
    Ok(normalize(&image))
}
