// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! imgproxy-compatible URL signing.
//!
//! ```text
//! path      = /{options}/{base64url(source_url)}
//! signature = base64url(HMAC-SHA256(key, salt || path))
//! url       = {endpoint}/{signature}{path}
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use imgstore_common_secret::Secret;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignerError {
	#[error("imgproxy {field} is not valid hex: {source}")]
	InvalidHex {
		field: &'static str,
		#[source]
		source: hex::FromHexError,
	},

	#[error("imgproxy {field} is empty")]
	Empty { field: &'static str },

	#[error("imgproxy endpoint is empty")]
	EmptyEndpoint,
}

/// Signs transform requests for one upstream endpoint.
///
/// Key and salt are decoded once at construction; `options` is passed
/// through verbatim.
#[derive(Debug, Clone)]
pub struct TransformUrlSigner {
	key: Secret<Vec<u8>>,
	salt: Secret<Vec<u8>>,
	endpoint: String,
}

fn decode_hex(field: &'static str, value: &str) -> Result<Secret<Vec<u8>>, SignerError> {
	let bytes = hex::decode(value.trim()).map_err(|source| SignerError::InvalidHex { field, source })?;
	if bytes.is_empty() {
		return Err(SignerError::Empty { field });
	}
	Ok(Secret::new(bytes))
}

impl TransformUrlSigner {
	pub fn new(key_hex: &str, salt_hex: &str, endpoint: impl Into<String>) -> Result<Self, SignerError> {
		let endpoint = endpoint.into().trim_end_matches('/').to_string();
		if endpoint.is_empty() {
			return Err(SignerError::EmptyEndpoint);
		}
		Ok(Self {
			key: decode_hex("key", key_hex)?,
			salt: decode_hex("salt", salt_hex)?,
			endpoint,
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Full signed URL that asks the endpoint to apply `options` to
	/// `source_url`.
	pub fn sign(&self, source_url: &str, options: &str) -> String {
		let path = format!("/{options}/{}", URL_SAFE_NO_PAD.encode(source_url));
		let signature = self.sign_path(&path);
		format!("{}/{signature}{path}", self.endpoint)
	}

	/// Signature segment for an already-built path (leading `/` included).
	pub fn sign_path(&self, path: &str) -> String {
		let mut mac =
			HmacSha256::new_from_slice(self.key.expose()).expect("HMAC can take key of any size");
		mac.update(self.salt.expose());
		mac.update(path.as_bytes());
		URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
	}
}
