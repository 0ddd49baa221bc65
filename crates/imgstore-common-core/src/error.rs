// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error classification.
//!
//! Every crate keeps its own `thiserror` enum whose `Display` text is the
//! internal diagnostic. [`ClassifiedError::kind`] reduces that enum to an
//! [`ErrorKind`], and [`ErrorKind::public`] is the only thing a client ever
//! sees.

use http::StatusCode;

/// Coarse failure category shared by all core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Missing or wrong bearer credential at the HTTP boundary.
	Unauthorized,
	/// Capability token failed signature, structure, issuer or expiry checks.
	InvalidToken,
	/// Token is valid but lacks a required permission.
	InsufficientPermissions,
	/// Referenced object does not exist in the blob store.
	NotFound,
	/// The transform endpoint answered non-2xx or could not be reached.
	UpstreamFailure,
	/// Malformed request at the HTTP boundary.
	BadRequest,
	/// Anything unclassified.
	Internal,
}

/// Status code and client-safe message for an [`ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicError {
	pub status: StatusCode,
	pub message: &'static str,
}

const INTERNAL_MESSAGE: &str = "internal server error";

impl ErrorKind {
	pub fn public(self) -> PublicError {
		let (status, message) = match self {
			ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
			ErrorKind::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
			ErrorKind::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
			ErrorKind::NotFound => (StatusCode::NOT_FOUND, "Image not found"),
			ErrorKind::UpstreamFailure => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE),
			ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, "Bad request"),
			ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE),
		};
		PublicError { status, message }
	}

	pub fn status(self) -> StatusCode {
		self.public().status
	}
}

/// Implemented by every error type that can cross the HTTP boundary.
pub trait ClassifiedError: std::error::Error {
	fn kind(&self) -> ErrorKind;

	fn public(&self) -> PublicError {
		self.kind().public()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_failures_map_to_401_and_403() {
		assert_eq!(ErrorKind::InvalidToken.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			ErrorKind::InsufficientPermissions.status(),
			StatusCode::FORBIDDEN
		);
	}

	#[test]
	fn upstream_failure_has_no_public_detail() {
		let public = ErrorKind::UpstreamFailure.public();
		assert_eq!(public.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(public.message, ErrorKind::Internal.public().message);
	}

	#[test]
	fn not_found_is_404() {
		assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
	}
}
