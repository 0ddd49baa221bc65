// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use imgstore_common_core::{ClassifiedError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("invalid object key '{key}': {reason}")]
	InvalidKey { key: String, reason: &'static str },

	#[error("storage I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("corrupt object metadata: {0}")]
	Metadata(#[from] serde_json::Error),
}

impl StorageError {
	pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
		Self::InvalidKey {
			key: key.into(),
			reason,
		}
	}
}

impl ClassifiedError for StorageError {
	fn kind(&self) -> ErrorKind {
		match self {
			StorageError::InvalidKey { .. } => ErrorKind::BadRequest,
			StorageError::Io(_) | StorageError::Metadata(_) => ErrorKind::Internal,
		}
	}
}
