// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Transform tokens and the cache they redeem against.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use imgstore_storage::{BlobStore, ObjectMetadata, StoredObject};
use imgstore_token::{CapabilityTokenService, Expiration, IssuedAt, Permission, TokenRequest};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::cache_key::CacheKey;
use crate::error::TransformError;
use crate::signer::TransformUrlSigner;

/// Default cap on a transformed image read from the endpoint.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 25 * 1024 * 1024;

/// Payload embedded in a transform token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformPayload {
	pub filename: String,
	pub options: String,
}

/// Where a transformed image can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePointer {
	/// Blob store key, `cache/{key}`.
	pub object_key: String,
	/// Public URL of the cached object.
	pub url: String,
	/// False when this call fetched and stored the object.
	pub hit: bool,
}

pub struct TransformService {
	tokens: CapabilityTokenService,
	store: Arc<dyn BlobStore>,
	signer: TransformUrlSigner,
	http: reqwest::Client,
	public_base_url: String,
	token_expiration: Expiration,
	max_response_bytes: usize,
}

impl TransformService {
	/// `public_base_url` is the public origin of the blob store: source images
	/// are handed to the transform endpoint as `{public_base_url}/{filename}`
	/// and cache pointers are `{public_base_url}/cache/{key}`.
	pub fn new(
		tokens: CapabilityTokenService,
		store: Arc<dyn BlobStore>,
		signer: TransformUrlSigner,
		http: reqwest::Client,
		public_base_url: impl Into<String>,
	) -> Self {
		Self {
			tokens,
			store,
			signer,
			http,
			public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
			token_expiration: Expiration::hours(24),
			max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
		}
	}

	pub fn with_token_expiration(mut self, expiration: Expiration) -> Self {
		self.token_expiration = expiration;
		self
	}

	pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
		self.max_response_bytes = limit;
		self
	}

	fn public_url(&self, key: &str) -> String {
		format!("{}/{key}", self.public_base_url)
	}

	/// Mint a `file:transform` token for `filename` with `options`.
	///
	/// Uses a start-of-day `iat`, so the same request made twice on one UTC day
	/// yields the same token and the same redemption URL.
	///
	/// The configured expiration is a lower bound: the token expires at the
	/// first UTC midnight at least that long after the start of the next day,
	/// so the default 24 hours gives a lifetime between 24 and 48 hours.
	#[instrument(skip(self))]
	pub async fn generate_token(&self, filename: &str, options: &str) -> Result<String, TransformError> {
		let token = self
			.tokens
			.sign(
				TokenRequest {
					permissions: vec![Permission::FileTransform],
					expiration: self.token_expiration,
					data: TransformPayload {
						filename: filename.to_string(),
						options: options.to_string(),
					},
				},
				IssuedAt::StartOfDay,
			)
			.await?;
		Ok(token)
	}

	/// Resolve a transform token to a cached object, populating the cache on
	/// a miss.
	///
	/// Concurrent redemptions of the same token may both miss and both fetch;
	/// they write identical bytes to the same key and return the same pointer.
	#[instrument(skip(self, token))]
	pub async fn redeem(&self, token: &str) -> Result<CachePointer, TransformError> {
		let claims = self
			.tokens
			.verify::<TransformPayload>(token, &[Permission::FileTransform])
			.await?;
		let TransformPayload { filename, options } = claims.data;

		let cache_key = CacheKey::derive(&filename, &options);
		let object_key = cache_key.object_key();
		let url = self.public_url(&object_key);

		if self.store.head(&object_key).await?.is_some() {
			debug!(%cache_key, "transform cache hit");
			return Ok(CachePointer {
				object_key,
				url,
				hit: true,
			});
		}

		if self.store.head(&filename).await?.is_none() {
			warn!(filename = %filename, "transform source not found");
			return Err(TransformError::NotFound { filename });
		}

		let signed_url = self.signer.sign(&self.public_url(&filename), &options);
		let mut response = self
			.http
			.get(&signed_url)
			.header(ACCEPT, "image/*")
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			warn!(status = status.as_u16(), filename = %filename, "transform endpoint failed");
			return Err(TransformError::Upstream {
				status: status.as_u16(),
				body,
			});
		}

		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);
		let body = self.read_limited(&mut response).await?;
		let size = body.len();

		self.store
			.put(&object_key, body, ObjectMetadata::with_content_type(content_type))
			.await?;

		info!(%cache_key, filename = %filename, size, "populated transform cache");
		Ok(CachePointer {
			object_key,
			url,
			hit: false,
		})
	}

	/// Read the response body, failing once it passes `max_response_bytes`.
	async fn read_limited(&self, response: &mut reqwest::Response) -> Result<Bytes, TransformError> {
		let limit = self.max_response_bytes;
		if response.content_length().is_some_and(|len| len > limit as u64) {
			return Err(TransformError::ResponseTooLarge { limit });
		}

		let mut body = BytesMut::new();
		while let Some(chunk) = response.chunk().await? {
			if body.len() + chunk.len() > limit {
				return Err(TransformError::ResponseTooLarge { limit });
			}
			body.extend_from_slice(&chunk);
		}
		Ok(body.freeze())
	}

	/// Stored object at `path`, for the authenticated raw download route.
	#[instrument(skip(self))]
	pub async fn raw_object(&self, path: &str) -> Result<StoredObject, TransformError> {
		self.store
			.get(path)
			.await?
			.ok_or_else(|| TransformError::NotFound {
				filename: path.to_string(),
			})
	}
}

impl std::fmt::Debug for TransformService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransformService")
			.field("endpoint", &self.signer.endpoint())
			.field("public_base_url", &self.public_base_url)
			.field("token_expiration", &self.token_expiration)
			.field("max_response_bytes", &self.max_response_bytes)
			.finish_non_exhaustive()
	}
}
