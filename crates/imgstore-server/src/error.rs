// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use imgstore_common_core::{ClassifiedError, ErrorKind};
use imgstore_storage::StorageError;
use imgstore_transform::{SignerError, TransformError};
use imgstore_upload::UploadError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("missing or invalid access token")]
	Unauthorized,

	#[error("bad request: {0}")]
	BadRequest(String),

	#[error(transparent)]
	Transform(#[from] TransformError),

	#[error(transparent)]
	Upload(#[from] UploadError),
}

/// Failure to assemble [`crate::AppState`] from configuration.
#[derive(Debug, Error)]
pub enum StartupError {
	#[error("failed to open blob store: {0}")]
	Storage(#[from] StorageError),

	#[error("invalid imgproxy credentials: {0}")]
	Signer(#[from] SignerError),

	#[error("failed to build HTTP client: {0}")]
	HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub error: &'static str,
}

impl ClassifiedError for ApiError {
	fn kind(&self) -> ErrorKind {
		match self {
			ApiError::Unauthorized => ErrorKind::Unauthorized,
			ApiError::BadRequest(_) => ErrorKind::BadRequest,
			ApiError::Transform(e) => e.kind(),
			ApiError::Upload(e) => e.kind(),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let kind = self.kind();
		match kind {
			ErrorKind::UpstreamFailure | ErrorKind::Internal => {
				tracing::error!(error = %self, kind = ?kind, "request failed");
			}
			ErrorKind::NotFound | ErrorKind::BadRequest => {
				tracing::debug!(error = %self, kind = ?kind, "request rejected");
			}
			ErrorKind::Unauthorized | ErrorKind::InvalidToken | ErrorKind::InsufficientPermissions => {
				tracing::warn!(error = %self, kind = ?kind, "request not authorised");
			}
		}

		let public = kind.public();
		(public.status, Json(ErrorBody { error: public.message })).into_response()
	}
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		self.kind().status()
	}
}
