// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the BitPen node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-digit-classifier-2026-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &["digit-upload", "digit-canvas", "chat-proxy"];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("BitPen Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
