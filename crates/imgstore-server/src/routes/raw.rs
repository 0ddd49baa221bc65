// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::{
	extract::{Path, State},
	http::{header, HeaderMap, HeaderValue},
	response::IntoResponse,
};

use crate::{api::AppState, error::ApiError};

/// Used when the stored object carries no cache policy of its own.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=86400";

/// GET /raw/{*path} - Stream a stored object back to an operator.
pub async fn raw(
	State(state): State<AppState>,
	Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let object = state.transform.raw_object(&path).await?;
	let metadata = &object.info.metadata;

	let mut headers = HeaderMap::new();
	if let Some(value) = metadata
		.content_type
		.as_deref()
		.and_then(|v| HeaderValue::from_str(v).ok())
	{
		headers.insert(header::CONTENT_TYPE, value);
	}
	let cache_control = metadata
		.cache_control
		.as_deref()
		.and_then(|v| HeaderValue::from_str(v).ok())
		.unwrap_or(HeaderValue::from_static(DEFAULT_CACHE_CONTROL));
	headers.insert(header::CACHE_CONTROL, cache_control);

	Ok((headers, object.body))
}
