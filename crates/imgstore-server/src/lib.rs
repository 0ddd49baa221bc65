// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! imgstore HTTP gateway.
//!
//! Wires the token, transform and upload services behind an axum router.
//! Operator routes require the configured bearer access token; the redeem and
//! upload routes are authorised by the capability token in the path.

pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use api::{create_app_state, create_router, cors_layer, AppState};
pub use error::{ApiError, StartupError};
pub use imgstore_server_config::ServerConfig;
