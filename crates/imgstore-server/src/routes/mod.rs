// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

pub mod check;
pub mod raw;
pub mod transform;
pub mod upload;

use serde::Serialize;

/// Body of every endpoint that mints a capability token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
	pub token: String,
}
