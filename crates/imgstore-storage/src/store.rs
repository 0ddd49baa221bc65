// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageError;
use crate::types::{ObjectInfo, ObjectMetadata, StoredObject};

/// Key/value blob storage as seen by the token-gated services.
///
/// Implementations must make `put` all-or-nothing: a concurrent `head` or
/// `get` observes either the previous object or the new one, never a partial
/// write. Concurrent `put`s to the same key are allowed; the last one wins.
#[async_trait]
pub trait BlobStore: Send + Sync {
	/// Metadata for `key`, or `None` if absent. Does not read the body.
	async fn head(&self, key: &str) -> Result<Option<ObjectInfo>, StorageError>;

	async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;

	async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata)
		-> Result<(), StorageError>;

	/// Remove `key`. Deleting an absent key succeeds.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.head(key).await?.is_some())
	}
}
