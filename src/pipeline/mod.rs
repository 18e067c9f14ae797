// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification pipeline
//!
//! Drives one submission through
//! `Received -> Staged -> Decoded -> Normalized -> Classified -> Responded`.
//! The staged file is removed on every exit path, including failures at any
//! stage. Upload and canvas submissions differ only in how they are labelled
//! in logs; after staging they take the exact same path.

pub mod errors;

use std::fmt;

use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::staging::{StagedFile, StagingArea};
use crate::vision::{decode_image_bytes_with_limit, normalize, Digit, ModelRuntime, MAX_IMAGE_SIZE};

pub use errors::{ClassifyError, ErrorKind};

/// Entry point a submission arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionSource {
    Upload,
    Canvas,
}

impl fmt::Display for SubmissionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionSource::Upload => write!(f, "upload"),
            SubmissionSource::Canvas => write!(f, "canvas"),
        }
    }
}

/// Raw image bytes plus the client's filename hint
#[derive(Debug, Clone)]
pub struct Submission {
    pub source: SubmissionSource,
    pub filename: String,
    pub bytes: Bytes,
}

impl Submission {
    pub fn upload(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            source: SubmissionSource::Upload,
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn canvas(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            source: SubmissionSource::Canvas,
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Staged,
    Decoded,
    Normalized,
    Classified,
    Responded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Staged => "staged",
            PipelineStage::Decoded => "decoded",
            PipelineStage::Normalized => "normalized",
            PipelineStage::Classified => "classified",
            PipelineStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Staging area plus model runtime, shared by every request
#[derive(Debug, Clone)]
pub struct ClassificationPipeline {
    staging: StagingArea,
    runtime: ModelRuntime,
    max_image_bytes: usize,
}

impl ClassificationPipeline {
    pub fn new(staging: StagingArea, runtime: ModelRuntime) -> Self {
        Self {
            staging,
            runtime,
            max_image_bytes: MAX_IMAGE_SIZE,
        }
    }

    /// Override the largest image the decoder accepts
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn runtime(&self) -> &ModelRuntime {
        &self.runtime
    }

    /// Classify one submission
    ///
    /// Blocking: performs disk I/O and model scoring on the calling thread.
    pub fn run(&self, request_id: Uuid, submission: Submission) -> Result<Digit, ClassifyError> {
        debug!(
            "[{}] {}: {} submission '{}' ({} bytes)",
            request_id,
            PipelineStage::Received,
            submission.source,
            submission.filename,
            submission.bytes.len()
        );

        let staged = self
            .staging
            .stage(&request_id, &submission.filename, &submission.bytes)
            .map_err(|e| {
                warn!("[{}] failed at {}: {}", request_id, PipelineStage::Received, e);
                ClassifyError::from(e)
            })?;
        let source = submission.source;
        drop(submission);
        debug!("[{}] {}: {}", request_id, PipelineStage::Staged, staged.path().display());

        let outcome = self.process(&request_id, &staged);

        // Cleanup runs regardless of outcome
        let cleanup = staged.remove();

        match (outcome, cleanup) {
            (Ok(digit), Ok(())) => {
                info!("[{}] {} classified as {}", request_id, source, digit);
                debug!("[{}] {}", request_id, PipelineStage::Responded);
                Ok(digit)
            }
            (Ok(_), Err(e)) => {
                warn!("[{}] cleanup failed after classification: {}", request_id, e);
                Err(e.into())
            }
            (Err((stage, e)), cleanup) => {
                warn!("[{}] failed after {}: {}", request_id, stage, e);
                if let Err(cleanup_err) = cleanup {
                    warn!("[{}] cleanup also failed: {}", request_id, cleanup_err);
                }
                Err(e)
            }
        }
    }

    /// Decode, normalize and classify a staged upload
    ///
    /// Errors carry the last stage that completed.
    fn process(
        &self,
        request_id: &Uuid,
        staged: &StagedFile,
    ) -> Result<Digit, (PipelineStage, ClassifyError)> {
        let bytes = staged
            .read_bytes()
            .map_err(|e| (PipelineStage::Staged, e.into()))?;

        let (image, info) = decode_image_bytes_with_limit(&bytes, self.max_image_bytes)
            .map_err(|e| (PipelineStage::Staged, e.into()))?;
        debug!(
            "[{}] {}: {}x{} {:?}",
            request_id,
            PipelineStage::Decoded,
            info.width,
            info.height,
            info.format
        );

        let tensor = normalize(&image);
        debug!("[{}] {}: mean {:.4}", request_id, PipelineStage::Normalized, tensor.mean());

        let digit = self
            .runtime
            .classify(&tensor)
            .map_err(|e| (PipelineStage::Normalized, e.into()))?;
        debug!("[{}] {}: {}", request_id, PipelineStage::Classified, digit);

        Ok(digit)
    }
}
