// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Transform token issuance and redemption handlers.

use axum::{
	extract::{rejection::JsonRejection, Path, State},
	http::{header, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use serde::Deserialize;

use super::TokenResponse;
use crate::{api::AppState, error::ApiError};

/// Cache policy on redemption redirects. The target is content-addressed, so
/// the redirect can be cached for as long as the token is plausibly valid.
pub const REDIRECT_CACHE_CONTROL: &str = "public, max-age=86400, stale-while-revalidate=600";

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
	pub filename: String,
	pub options: String,
}

/// POST /transform/generate - Mint a transform token for `{filename, options}`.
pub async fn generate(
	State(state): State<AppState>,
	payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
	let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
	let token = state
		.transform
		.generate_token(&request.filename, &request.options)
		.await?;
	Ok(Json(TokenResponse { token }))
}

/// GET /transform/{token} - Redirect to the cached transform, producing it on a miss.
pub async fn redeem(
	State(state): State<AppState>,
	Path(token): Path<String>,
) -> Result<Response, ApiError> {
	let pointer = state.transform.redeem(&token).await?;
	tracing::debug!(object_key = %pointer.object_key, hit = pointer.hit, "redeemed transform token");

	Ok((
		StatusCode::FOUND,
		[
			(header::LOCATION, pointer.url),
			(header::CACHE_CONTROL, REDIRECT_CACHE_CONTROL.to_string()),
		],
	)
		.into_response())
}
