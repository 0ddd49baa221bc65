// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capability token root secret and lifetimes.

use std::time::Duration;

use imgstore_common_config::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_ROTATION_WINDOW: Duration = Duration::from_secs(14 * 24 * 60 * 60);
const DEFAULT_TRANSFORM_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_UPLOAD_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct TokensConfig {
	/// Root secret every window key is derived from.
	pub secret: SecretString,
	pub rotation_window: Duration,
	pub transform_ttl: Duration,
	pub upload_ttl: Duration,
}

/// Durations are `humantime` strings such as `"14days"` or `"5m"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokensConfigLayer {
	/// Environment only.
	#[serde(skip)]
	pub secret: Option<SecretString>,
	#[serde(default)]
	pub rotation_window: Option<String>,
	#[serde(default)]
	pub transform_ttl: Option<String>,
	#[serde(default)]
	pub upload_ttl: Option<String>,
}

fn parse_duration(key: &str, value: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
	let Some(raw) = value else {
		return Ok(default);
	};
	let duration = humantime::parse_duration(raw.trim())
		.map_err(|e| ConfigError::invalid(key, format!("invalid duration '{raw}': {e}")))?;
	if duration.is_zero() {
		return Err(ConfigError::invalid(key, "duration must be greater than zero"));
	}
	Ok(duration)
}

impl TokensConfigLayer {
	pub fn merge(&mut self, other: TokensConfigLayer) {
		if other.secret.is_some() {
			self.secret = other.secret;
		}
		if other.rotation_window.is_some() {
			self.rotation_window = other.rotation_window;
		}
		if other.transform_ttl.is_some() {
			self.transform_ttl = other.transform_ttl;
		}
		if other.upload_ttl.is_some() {
			self.upload_ttl = other.upload_ttl;
		}
	}

	pub fn finalize(self) -> Result<TokensConfig, ConfigError> {
		let secret = self
			.secret
			.ok_or_else(|| ConfigError::MissingEnvVar("IMGSTORE_SERVER_TOKEN_SECRET".to_string()))?;
		if secret.is_empty() {
			return Err(ConfigError::Validation(
				"IMGSTORE_SERVER_TOKEN_SECRET must not be empty".to_string(),
			));
		}

		Ok(TokensConfig {
			secret,
			rotation_window: parse_duration(
				"tokens.rotation_window",
				self.rotation_window,
				DEFAULT_ROTATION_WINDOW,
			)?,
			transform_ttl: parse_duration(
				"tokens.transform_ttl",
				self.transform_ttl,
				DEFAULT_TRANSFORM_TTL,
			)?,
			upload_ttl: parse_duration("tokens.upload_ttl", self.upload_ttl, DEFAULT_UPLOAD_TTL)?,
		})
	}
}
