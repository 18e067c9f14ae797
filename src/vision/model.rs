// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Handwritten digit classifier runtime
//!
//! The model is loaded once at startup and shared read-only by every
//! request. [`DigitModel`] is the seam between the runtime and the network:
//! production uses [`OnnxDigitModel`], tests plug in their own scorers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::preprocessing::NormalizedTensor;

/// Size of the closed label set (digits 0-9)
pub const NUM_CLASSES: usize = 10;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model returned {actual} scores, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model returned a non-finite score at index {0}")]
    NonFinite(usize),

    #[error("Model runtime failed: {0}")]
    Runtime(String),
}

/// Fatal error raised while loading the model artifact
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Failed to load model from {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    #[error("Model failed its load-time probe: {0}")]
    Probe(#[from] InferenceError),
}

/// A classification label in `0..=9`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digit(u8);

impl Digit {
    pub const MAX: u8 = (NUM_CLASSES - 1) as u8;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<usize> for Digit {
    type Error = InferenceError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u8::try_from(index)
            .ok()
            .and_then(Digit::new)
            .ok_or(InferenceError::ShapeMismatch {
                expected: NUM_CLASSES,
                actual: index + 1,
            })
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A frozen network that scores a normalized tensor
pub trait DigitModel: Send + Sync {
    /// Human-readable model name for logs and health output
    fn name(&self) -> &str;

    /// Raw per-class scores, one per label
    fn scores(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>, InferenceError>;
}

/// Index of the highest score, lowest index wins ties
pub fn argmax(scores: &[f32]) -> Result<usize, InferenceError> {
    if scores.len() != NUM_CLASSES {
        return Err(InferenceError::ShapeMismatch {
            expected: NUM_CLASSES,
            actual: scores.len(),
        });
    }

    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(InferenceError::NonFinite(index));
    }

    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = index;
        }
    }
    Ok(best)
}

/// Shared handle to the loaded model
///
/// Cloning is cheap; all clones score through the same model instance.
#[derive(Clone)]
pub struct ModelRuntime {
    model: Arc<dyn DigitModel>,
}

impl fmt::Debug for ModelRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRuntime")
            .field("model", &self.model.name())
            .finish()
    }
}

impl ModelRuntime {
    pub fn new(model: Arc<dyn DigitModel>) -> Self {
        Self { model }
    }

    pub fn from_model<M: DigitModel + 'static>(model: M) -> Self {
        Self::new(Arc::new(model))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Score the tensor and return the winning label
    pub fn classify(&self, tensor: &NormalizedTensor) -> Result<Digit, InferenceError> {
        let scores = self.model.scores(tensor)?;
        let index = argmax(&scores)?;
        debug!("Classified as {} (score {:.4})", index, scores[index]);
        Digit::try_from(index)
    }
}

/// ONNX export of the handwriting network
///
/// Input is NHWC `[1, 28, 28, 1]` f32, output is `[1, 10]` class scores.
pub struct OnnxDigitModel {
    /// ONNX Runtime session; `run` needs exclusive access
    session: Mutex<Session>,

    /// Name of the graph's first input
    input_name: String,

    /// Model name (file stem of the artifact)
    model_name: String,

    path: PathBuf,
}

impl fmt::Debug for OnnxDigitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxDigitModel")
            .field("model_name", &self.model_name)
            .field("input_name", &self.input_name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl OnnxDigitModel {
    /// Load the model from disk and verify it produces ten scores
    ///
    /// # Errors
    /// Returns `StartupError` if:
    /// - The artifact does not exist
    /// - ONNX Runtime cannot build a session from it
    /// - A probe inference on a blank tensor fails or yields the wrong shape
    pub fn load(model_path: impl AsRef<Path>, intra_threads: usize) -> Result<Self, StartupError> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(StartupError::ArtifactMissing(path.to_path_buf()));
        }

        info!("Loading digit model from {}", path.display());

        let session = build_session(path, intra_threads).map_err(|e| StartupError::Load {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());
        debug!("Digit model input: {}", input_name);

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("digit-model")
            .to_string();

        let model = Self {
            session: Mutex::new(session),
            input_name,
            model_name,
            path: path.to_path_buf(),
        };

        // Reject artifacts that load but do not speak the 10-class contract
        let probe = model.scores(&NormalizedTensor::zeros())?;
        argmax(&probe)?;

        info!("Digit model '{}' loaded", model.model_name);
        Ok(model)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn build_session(path: &Path, intra_threads: usize) -> anyhow::Result<Session> {
    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(path)
        .context("Failed to commit ONNX model")?;
    Ok(session)
}

/// Lock the session even if an earlier `run` panicked while holding it
///
/// A panicking run leaves no partial state in the session, so one bad
/// request must not disable scoring for the rest of the process.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(|poisoned| {
        warn!("ONNX session lock was poisoned by a panicked inference, recovering");
        session.clear_poison();
        PoisonError::into_inner(poisoned)
    })
}

impl DigitModel for OnnxDigitModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn scores(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
        let input = Value::from_array(tensor.to_batch())
            .map_err(|e| InferenceError::Runtime(format!("Failed to build input tensor: {}", e)))?;

        let mut session = lock_session(&self.session);

        let outputs = session
            .run(ort::inputs![&self.input_name => input])
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        // Use index [0] since exported models name their outputs differently
        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("Failed to extract output tensor: {}", e)))?;

        Ok(scores.iter().copied().collect())
    }
}
