// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Upstream transform endpoint.

use imgstore_common_config::SecretString;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct ImgproxyConfig {
	pub endpoint: String,
	/// Hex-encoded HMAC key.
	pub key: SecretString,
	/// Hex-encoded HMAC salt.
	pub salt: SecretString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImgproxyConfigLayer {
	#[serde(default)]
	pub endpoint: Option<String>,
	/// Environment only.
	#[serde(skip)]
	pub key: Option<SecretString>,
	/// Environment only.
	#[serde(skip)]
	pub salt: Option<SecretString>,
}

impl ImgproxyConfigLayer {
	pub fn merge(&mut self, other: ImgproxyConfigLayer) {
		if other.endpoint.is_some() {
			self.endpoint = other.endpoint;
		}
		if other.key.is_some() {
			self.key = other.key;
		}
		if other.salt.is_some() {
			self.salt = other.salt;
		}
	}

	pub fn finalize(self) -> Result<ImgproxyConfig, ConfigError> {
		let endpoint = self
			.endpoint
			.ok_or_else(|| ConfigError::MissingEnvVar("IMGSTORE_SERVER_IMGPROXY_ENDPOINT".to_string()))?;
		Url::parse(&endpoint).map_err(|e| ConfigError::invalid("imgproxy.endpoint", e.to_string()))?;

		let key = self
			.key
			.ok_or_else(|| ConfigError::MissingEnvVar("IMGSTORE_SERVER_IMGPROXY_KEY".to_string()))?;
		let salt = self
			.salt
			.ok_or_else(|| ConfigError::MissingEnvVar("IMGSTORE_SERVER_IMGPROXY_SALT".to_string()))?;

		Ok(ImgproxyConfig {
			endpoint,
			key,
			salt,
		})
	}
}
