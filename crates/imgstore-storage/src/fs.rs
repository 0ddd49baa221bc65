// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Directory-backed blob store.
//!
//! Layout under the root directory:
//!
//! ```text
//! data/<key>         object bytes
//! meta/<key>.json    ObjectMetadata
//! ```
//!
//! Writes go to a uniquely named temp file and are renamed into place, so
//! concurrent writers to the same key never interleave. Metadata is written
//! before the body; the body rename is the commit point.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::key::validate_key;
use crate::store::BlobStore;
use crate::types::{ObjectInfo, ObjectMetadata, StoredObject};

#[derive(Debug, Clone)]
pub struct FsBlobStore {
	root: PathBuf,
}

impl FsBlobStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Create the root directory tree if needed.
	pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let store = Self::new(root);
		tokio::fs::create_dir_all(store.root.join("data")).await?;
		tokio::fs::create_dir_all(store.root.join("meta")).await?;
		info!(root = %store.root.display(), "opened filesystem blob store");
		Ok(store)
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn data_path(&self, key: &str) -> PathBuf {
		self.root.join("data").join(key)
	}

	fn meta_path(&self, key: &str) -> PathBuf {
		self.root.join("meta").join(format!("{key}.json"))
	}

	async fn read_metadata(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
		match tokio::fs::read(self.meta_path(key)).await {
			Ok(raw) => Ok(serde_json::from_slice(&raw)?),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(ObjectMetadata::default()),
			Err(e) => Err(e.into()),
		}
	}
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
	if let Some(parent) = path.parent() {
		tokio::fs::create_dir_all(parent).await?;
	}
	let file_name = path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_default();
	let tmp_path = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

	tokio::fs::write(&tmp_path, contents).await?;
	if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
		let _ = tokio::fs::remove_file(&tmp_path).await;
		return Err(e.into());
	}
	Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
	match tokio::fs::remove_file(path).await {
		Ok(()) => Ok(()),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
		Err(e) => Err(e.into()),
	}
}

#[async_trait]
impl BlobStore for FsBlobStore {
	async fn head(&self, key: &str) -> Result<Option<ObjectInfo>, StorageError> {
		validate_key(key)?;
		let size = match tokio::fs::metadata(self.data_path(key)).await {
			Ok(m) if m.is_file() => m.len(),
			Ok(_) => return Ok(None),
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e.into()),
		};
		let metadata = self.read_metadata(key).await?;
		Ok(Some(ObjectInfo {
			key: key.to_string(),
			size,
			metadata,
		}))
	}

	async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
		validate_key(key)?;
		let body = match tokio::fs::read(self.data_path(key)).await {
			Ok(body) => Bytes::from(body),
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e.into()),
		};
		let metadata = self.read_metadata(key).await?;
		Ok(Some(StoredObject {
			info: ObjectInfo {
				key: key.to_string(),
				size: body.len() as u64,
				metadata,
			},
			body,
		}))
	}

	async fn put(
		&self,
		key: &str,
		body: Bytes,
		metadata: ObjectMetadata,
	) -> Result<(), StorageError> {
		validate_key(key)?;
		let meta_json = serde_json::to_vec(&metadata)?;
		write_atomic(&self.meta_path(key), &meta_json).await?;
		write_atomic(&self.data_path(key), &body).await?;
		debug!(key, size = body.len(), "stored object on disk");
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		validate_key(key)?;
		remove_if_exists(&self.data_path(key)).await?;
		remove_if_exists(&self.meta_path(key)).await?;
		debug!(key, "deleted object");
		Ok(())
	}
}
