// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Token-gated uploads into the `image/` namespace.

pub mod error;
pub mod service;

pub use error::UploadError;
pub use service::{UploadGrant, UploadRequest, UploadService, UPLOAD_PREFIX};
