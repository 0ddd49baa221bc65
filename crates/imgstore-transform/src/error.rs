// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use imgstore_common_core::{ClassifiedError, ErrorKind};
use imgstore_storage::StorageError;
use imgstore_token::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
	#[error(transparent)]
	Token(#[from] TokenError),

	#[error("source image not found: {filename}")]
	NotFound { filename: String },

	/// The transform endpoint answered with a non-2xx status.
	#[error("transform endpoint returned {status}: {body}")]
	Upstream { status: u16, body: String },

	#[error("transform endpoint response exceeds {limit} bytes")]
	ResponseTooLarge { limit: usize },

	#[error("transform endpoint unreachable: {0}")]
	Transport(#[from] reqwest::Error),

	#[error(transparent)]
	Storage(#[from] StorageError),
}

impl ClassifiedError for TransformError {
	fn kind(&self) -> ErrorKind {
		match self {
			TransformError::Token(e) => e.kind(),
			TransformError::NotFound { .. } => ErrorKind::NotFound,
			TransformError::Upstream { .. }
			| TransformError::ResponseTooLarge { .. }
			| TransformError::Transport(_) => ErrorKind::UpstreamFailure,
			TransformError::Storage(e) => e.kind(),
		}
	}
}
