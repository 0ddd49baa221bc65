// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use bytes::Bytes;
use imgstore_storage::{BlobStore, ObjectMetadata, StoredObject};
use imgstore_token::{CapabilityTokenService, Expiration, IssuedAt, Permission, TokenRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::UploadError;

/// Blob store prefix for uploaded images.
pub const UPLOAD_PREFIX: &str = "image";

/// Payload of an upload token. Carries nothing; the token itself is the grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadGrant {}

#[derive(Debug, Clone)]
pub struct UploadRequest {
	/// Client-supplied name. Replaced by a fresh UUID when empty.
	pub filename: String,
	pub content_type: Option<String>,
	pub body: Bytes,
}

pub struct UploadService {
	tokens: CapabilityTokenService,
	store: Arc<dyn BlobStore>,
	token_expiration: Expiration,
}

impl UploadService {
	pub fn new(tokens: CapabilityTokenService, store: Arc<dyn BlobStore>) -> Self {
		Self {
			tokens,
			store,
			token_expiration: Expiration::minutes(5),
		}
	}

	pub fn with_token_expiration(mut self, expiration: Expiration) -> Self {
		self.token_expiration = expiration;
		self
	}

	/// Mint a short-lived `file:upload` token.
	#[instrument(skip(self))]
	pub async fn issue_token(&self) -> Result<String, UploadError> {
		let token = self
			.tokens
			.sign(
				TokenRequest {
					permissions: vec![Permission::FileUpload],
					expiration: self.token_expiration,
					data: UploadGrant::default(),
				},
				IssuedAt::Exact,
			)
			.await?;
		Ok(token)
	}

	/// Store `request` under `image/{uuid}/{filename}` and return that path.
	///
	/// The token is not consumed: it may be reused until it expires.
	#[instrument(skip(self, token, request), fields(filename = %request.filename, size = request.body.len()))]
	pub async fn upload(&self, token: &str, request: UploadRequest) -> Result<String, UploadError> {
		self.tokens
			.verify::<UploadGrant>(token, &[Permission::FileUpload])
			.await?;

		let filename = if request.filename.is_empty() {
			Uuid::new_v4().to_string()
		} else {
			request.filename
		};
		let path = format!("{UPLOAD_PREFIX}/{}/{filename}", Uuid::new_v4());
		let size = request.body.len();

		self.store
			.put(
				&path,
				request.body,
				ObjectMetadata::with_content_type(request.content_type),
			)
			.await?;

		info!(path = %path, size, "stored upload");
		Ok(path)
	}

	pub async fn download(&self, path: &str) -> Result<StoredObject, UploadError> {
		self.store
			.get(path)
			.await?
			.ok_or_else(|| UploadError::NotFound {
				path: path.to_string(),
			})
	}
}

impl std::fmt::Debug for UploadService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("UploadService")
			.field("token_expiration", &self.token_expiration)
			.finish_non_exhaustive()
	}
}
