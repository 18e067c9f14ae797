// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod chat;
pub mod config;
pub mod pipeline;
pub mod staging;
pub mod version;
pub mod vision;

pub use config::NodeConfig;
pub use pipeline::{ClassificationPipeline, ClassifyError, Submission, SubmissionSource};
pub use staging::StagingArea;
pub use vision::{Digit, ModelRuntime, OnnxDigitModel};
