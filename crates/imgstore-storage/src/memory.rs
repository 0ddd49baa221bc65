// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-process blob store for tests and throwaway deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;
use crate::key::validate_key;
use crate::store::BlobStore;
use crate::types::{ObjectInfo, ObjectMetadata, StoredObject};

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
	objects: RwLock<HashMap<String, (Bytes, ObjectMetadata)>>,
}

impl MemoryBlobStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored objects.
	pub async fn len(&self) -> usize {
		self.objects.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.objects.read().await.is_empty()
	}

	/// Stored keys in sorted order.
	pub async fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
		keys.sort();
		keys
	}
}

fn info(key: &str, body: &Bytes, metadata: &ObjectMetadata) -> ObjectInfo {
	ObjectInfo {
		key: key.to_string(),
		size: body.len() as u64,
		metadata: metadata.clone(),
	}
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
	async fn head(&self, key: &str) -> Result<Option<ObjectInfo>, StorageError> {
		validate_key(key)?;
		let objects = self.objects.read().await;
		Ok(objects
			.get(key)
			.map(|(body, metadata)| info(key, body, metadata)))
	}

	async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
		validate_key(key)?;
		let objects = self.objects.read().await;
		Ok(objects.get(key).map(|(body, metadata)| StoredObject {
			info: info(key, body, metadata),
			body: body.clone(),
		}))
	}

	async fn put(
		&self,
		key: &str,
		body: Bytes,
		metadata: ObjectMetadata,
	) -> Result<(), StorageError> {
		validate_key(key)?;
		debug!(key, size = body.len(), "storing object in memory");
		self.objects
			.write()
			.await
			.insert(key.to_string(), (body, metadata));
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		validate_key(key)?;
		self.objects.write().await.remove(key);
		Ok(())
	}
}
