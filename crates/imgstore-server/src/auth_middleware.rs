// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Bearer access-token check for operator routes.
//!
//! Both the presented and the configured token are hashed with SHA-256 and the
//! digests compared without early exit, so response timing does not reveal how
//! much of a guess was right.

use axum::{
	body::Body,
	extract::State,
	http::{header, HeaderMap, Request},
	middleware::Next,
	response::Response,
};
use sha2::{Digest, Sha256};

use crate::{api::AppState, error::ApiError};

/// Reject the request with 401 unless it carries `Authorization: Bearer <access token>`.
pub async fn require_access_token(
	State(state): State<AppState>,
	request: Request<Body>,
	next: Next,
) -> Result<Response, ApiError> {
	let authorised = bearer_token(request.headers())
		.is_some_and(|token| token_matches(token, state.access_token.expose()));
	if !authorised {
		tracing::debug!(path = %request.uri().path(), "missing or wrong access token");
		return Err(ApiError::Unauthorized);
	}
	Ok(next.run(request).await)
}

/// Credential from an `Authorization: Bearer <token>` header. The scheme is
/// case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
	let (scheme, token) = value.split_once(' ')?;
	if !scheme.eq_ignore_ascii_case("bearer") {
		return None;
	}
	let token = token.trim();
	(!token.is_empty()).then_some(token)
}

fn token_matches(presented: &str, expected: &str) -> bool {
	let presented = Sha256::digest(presented.as_bytes());
	let expected = Sha256::digest(expected.as_bytes());
	presented
		.iter()
		.zip(expected.iter())
		.fold(0u8, |acc, (a, b)| acc | (a ^ b))
		== 0
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;

	fn headers(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
		headers
	}

	#[test]
	fn extracts_bearer_token() {
		assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
		assert_eq!(bearer_token(&headers("bearer abc123")), Some("abc123"));
	}

	#[test]
	fn rejects_other_schemes_and_empty_tokens() {
		assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
		assert_eq!(bearer_token(&headers("Bearer")), None);
		assert_eq!(bearer_token(&headers("Bearer   ")), None);
		assert_eq!(bearer_token(&HeaderMap::new()), None);
	}

	#[test]
	fn token_comparison() {
		assert!(token_matches("s3cret", "s3cret"));
		assert!(!token_matches("s3cret", "s3cret2"));
		assert!(!token_matches("", "s3cret"));
	}
}
