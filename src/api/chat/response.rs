// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat response types

use serde::{Deserialize, Serialize};

use crate::chat::ChatReply;

/// URL prefix under which synthesized audio is published
pub const AUDIO_URL_PREFIX: &str = "/audio";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub user_input: String,
    pub response: String,
    pub audio_url: Option<String>,
}

impl ChatResponse {
    pub fn new(user_input: String, reply: ChatReply) -> Self {
        let audio_url = reply
            .audio_path
            .as_deref()
            .and_then(|path| path.file_name())
            .and_then(|name| name.to_str())
            .map(|name| format!("{}/{}", AUDIO_URL_PREFIX, name));

        Self {
            user_input,
            response: reply.response,
            audio_url,
        }
    }
}
