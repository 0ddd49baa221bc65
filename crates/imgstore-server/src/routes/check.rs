// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CheckResponse {
	pub ok: bool,
}

/// GET /check - Confirms the caller's access token.
pub async fn check() -> Json<CheckResponse> {
	Json(CheckResponse { ok: true })
}
