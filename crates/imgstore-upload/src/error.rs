// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use imgstore_common_core::{ClassifiedError, ErrorKind};
use imgstore_storage::StorageError;
use imgstore_token::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
	#[error(transparent)]
	Token(#[from] TokenError),

	#[error("object not found: {path}")]
	NotFound { path: String },

	#[error(transparent)]
	Storage(#[from] StorageError),
}

impl ClassifiedError for UploadError {
	fn kind(&self) -> ErrorKind {
		match self {
			UploadError::Token(e) => e.kind(),
			UploadError::NotFound { .. } => ErrorKind::NotFound,
			UploadError::Storage(e) => e.kind(),
		}
	}
}
