// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat API endpoint module
//!
//! Provides POST /chat, forwarding to the configured assistant.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::chat_handler;
pub use request::ChatRequest;
pub use response::{ChatResponse, AUDIO_URL_PREFIX};
