// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use imgstore_common_core::{ClassifiedError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
	/// Signature, structure, algorithm, issuer or expiry check failed.
	#[error("invalid token: {0}")]
	InvalidToken(String),

	#[error("insufficient permissions: missing {missing:?}, granted {granted:?}")]
	InsufficientPermissions {
		missing: Vec<String>,
		granted: Vec<String>,
	},

	#[error("failed to sign token: {0}")]
	Signing(String),

	#[error("invalid expiration '{0}': expected a duration like \"24h\" or an RFC 3339 timestamp")]
	InvalidExpiration(String),
}

impl ClassifiedError for TokenError {
	fn kind(&self) -> ErrorKind {
		match self {
			TokenError::InvalidToken(_) => ErrorKind::InvalidToken,
			TokenError::InsufficientPermissions { .. } => ErrorKind::InsufficientPermissions,
			TokenError::Signing(_) | TokenError::InvalidExpiration(_) => ErrorKind::Internal,
		}
	}
}
