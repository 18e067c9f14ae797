// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod chat;
pub mod errors;
pub mod handlers;
pub mod predict;
pub mod server;

pub use chat::{chat_handler, ChatRequest, ChatResponse};
pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use handlers::{health_handler, HealthResponse};
pub use predict::{predict_canvas_handler, predict_handler, ImageUpload, PredictResponse};
pub use server::{create_router, start_server, AppState};
