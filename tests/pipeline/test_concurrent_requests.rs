// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Concurrent submissions must each get their own answer and their own staged file

use bitpen::pipeline::{ClassificationPipeline, Submission};
use bitpen::staging::StagingArea;
use bitpen::vision::{DigitModel, InferenceError, ModelRuntime, NormalizedTensor, NUM_CLASSES};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// Scores the label nearest to `mean * 9`, so gray level picks the digit
struct Brightness;

impl DigitModel for Brightness {
    fn name(&self) -> &str {
        "brightness"
    }

    fn scores(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
        let target = (tensor.mean() * 9.0).round() as usize;
        let mut scores = vec![0.0; NUM_CLASSES];
        scores[target.min(NUM_CLASSES - 1)] = 1.0;
        Ok(scores)
    }
}

/// Uniform gray image whose brightness encodes `digit`
fn gray_png(digit: u8) -> Vec<u8> {
    let level = (digit as u32 * 255 / 9) as u8;
    let img = GrayImage::from_pixel(40, 40, Luma([level]));
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn setup_pipeline() -> (Arc<ClassificationPipeline>, TempDir) {
    let dir = TempDir::new().unwrap();
    let staging = StagingArea::open(dir.path()).unwrap();
    let pipeline = ClassificationPipeline::new(staging, ModelRuntime::from_model(Brightness));
    (Arc::new(pipeline), dir)
}

#[test]
fn test_gray_levels_map_to_digits() {
    let (pipeline, _dir) = setup_pipeline();

    for digit in 0..=9u8 {
        let result = pipeline
            .run(Uuid::new_v4(), Submission::upload("gray.png", gray_png(digit)))
            .unwrap();
        assert_eq!(result.value(), digit);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_do_not_cross() {
    let (pipeline, dir) = setup_pipeline();

    let mut handles = Vec::new();
    for round in 0..4 {
        for digit in 0..=9u8 {
            let pipeline = pipeline.clone();
            let submission = if round % 2 == 0 {
                Submission::upload("same-name.png", gray_png(digit))
            } else {
                Submission::canvas("same-name.png", gray_png(digit))
            };
            handles.push(tokio::task::spawn_blocking(move || {
                (digit, pipeline.run(Uuid::new_v4(), submission))
            }));
        }
    }

    for joined in futures_util::future::join_all(handles).await {
        let (expected, result) = joined.expect("Task panicked");
        let digit = result.expect("Classification should succeed");
        assert_eq!(digit.value(), expected);
    }

    assert_eq!(
        std::fs::read_dir(dir.path()).unwrap().count(),
        0,
        "All staged files should be removed"
    );
}

#[test]
fn test_same_request_id_does_not_collide() {
    let (pipeline, dir) = setup_pipeline();
    let request_id = Uuid::new_v4();

    let threads: Vec<_> = (0..8u8)
        .map(|digit| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || {
                pipeline
                    .run(request_id, Submission::upload("dup.png", gray_png(digit)))
                    .map(|d| (digit, d.value()))
            })
        })
        .collect();

    for thread in threads {
        let (expected, actual) = thread.join().unwrap().unwrap();
        assert_eq!(expected, actual);
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
