// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Properties of the image normalizer

use bitpen::vision::{normalize, preprocess_bytes, ImageError, INPUT_SIZE};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

#[test]
fn test_any_size_becomes_28x28x1() {
    let sizes = [(1, 1), (28, 28), (640, 480), (3, 900), (1000, 7)];
    for (w, h) in sizes {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([90, 90, 90])));
        let tensor = normalize(&img);
        assert_eq!(
            tensor.shape(),
            &[INPUT_SIZE as usize, INPUT_SIZE as usize, 1],
            "size {}x{}",
            w,
            h
        );
    }
}

#[test]
fn test_values_stay_in_unit_range() {
    let mut img = RgbImage::new(57, 31);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([(x * 4) as u8, (y * 8) as u8, ((x + y) * 3) as u8]);
    }
    let tensor = normalize(&DynamicImage::ImageRgb8(img));

    assert!(tensor.view().iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn test_white_and_black_extremes() {
    let white = normalize(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
        50,
        50,
        Rgb([255, 255, 255]),
    )));
    let black = normalize(&DynamicImage::ImageRgb8(RgbImage::new(50, 50)));

    assert!((white.mean() - 1.0).abs() < 1e-6);
    assert_eq!(black.mean(), 0.0);
}

#[test]
fn test_normalization_is_deterministic() {
    let bytes = encode(
        DynamicImage::ImageRgb8(RgbImage::from_fn(33, 77, |x, y| {
            Rgb([(x * 7) as u8, (y * 3) as u8, 128])
        })),
        ImageFormat::Png,
    );

    let first = preprocess_bytes(&bytes).unwrap();
    let second = preprocess_bytes(&bytes).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_alpha_channel_is_dropped() {
    let img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 0]));
    let bytes = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

    let tensor = preprocess_bytes(&bytes).unwrap();
    assert!((tensor.mean() - 1.0).abs() < 1e-6);
}

#[test]
fn test_undecodable_bytes_rejected() {
    assert!(matches!(preprocess_bytes(&[]), Err(ImageError::EmptyData)));
    assert!(preprocess_bytes(b"GIF89a but then garbage").is_err());
    assert!(preprocess_bytes(b"plain text").is_err());
}
