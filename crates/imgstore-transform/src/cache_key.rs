// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Blob store prefix for transformed images.
pub const CACHE_PREFIX: &str = "cache";

/// Content address of a transform: `base64url(SHA-256("{filename}?{options}"))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
	pub fn derive(filename: &str, options: &str) -> Self {
		let mut hasher = Sha256::new();
		hasher.update(filename.as_bytes());
		hasher.update(b"?");
		hasher.update(options.as_bytes());
		Self(URL_SAFE_NO_PAD.encode(hasher.finalize()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// `cache/{key}`
	pub fn object_key(&self) -> String {
		format!("{CACHE_PREFIX}/{}", self.0)
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
