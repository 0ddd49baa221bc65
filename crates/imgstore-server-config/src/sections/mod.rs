// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a `*ConfigLayer` (all fields optional,
//! merged across sources) and a resolved `*Config`.

mod auth;
mod http;
mod imgproxy;
mod logging;
mod storage;
mod tokens;

pub use auth::{AuthConfig, AuthConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use imgproxy::{ImgproxyConfig, ImgproxyConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use storage::{StorageBackend, StorageConfig, StorageConfigLayer};
pub use tokens::{TokensConfig, TokensConfigLayer};
