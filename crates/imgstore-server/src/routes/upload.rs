// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Upload token issuance and the token-gated upload itself.

use axum::{
	extract::{multipart::MultipartRejection, Multipart, Path, State},
	Json,
};
use imgstore_upload::UploadRequest;
use serde::Serialize;

use super::TokenResponse;
use crate::{api::AppState, error::ApiError};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
	/// Stored path, usable with `/raw/` and `/transform/generate`.
	pub filename: String,
}

/// POST /upload/create-token - Mint a short-lived upload token.
pub async fn create_token(State(state): State<AppState>) -> Result<Json<TokenResponse>, ApiError> {
	let token = state.upload.issue_token().await?;
	Ok(Json(TokenResponse { token }))
}

/// PUT /upload/{token} - Store the multipart `image` field.
pub async fn upload(
	State(state): State<AppState>,
	Path(token): Path<String>,
	multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
	let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
	let request = read_image_field(&mut multipart).await?;
	let filename = state.upload.upload(&token, request).await?;
	Ok(Json(UploadResponse { filename }))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<UploadRequest, ApiError> {
	while let Some(field) = multipart
		.next_field()
		.await
		.map_err(|e| ApiError::BadRequest(e.body_text()))?
	{
		if field.name() != Some(IMAGE_FIELD) {
			continue;
		}

		let filename = field.file_name().unwrap_or_default().to_string();
		let content_type = field.content_type().map(str::to_string);
		let body = field
			.bytes()
			.await
			.map_err(|e| ApiError::BadRequest(e.body_text()))?;

		return Ok(UploadRequest {
			filename,
			content_type,
			body,
		});
	}

	Err(ApiError::BadRequest(format!("missing multipart field '{IMAGE_FIELD}'")))
}
