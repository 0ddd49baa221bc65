// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Transform pipeline.
//!
//! A transform token names a stored source image and an opaque options
//! string. Redeeming it derives a content address from the pair, serves the
//! cached result if one exists, and otherwise asks an imgproxy-compatible
//! endpoint for the transformed bytes through a signed URL and stores them.

pub mod cache_key;
pub mod error;
pub mod service;
pub mod signer;

pub use cache_key::{CacheKey, CACHE_PREFIX};
pub use error::TransformError;
pub use service::{CachePointer, TransformPayload, TransformService, DEFAULT_MAX_RESPONSE_BYTES};
pub use signer::{SignerError, TransformUrlSigner};
