// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Administrative bearer credential.

use imgstore_common_config::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Bearer token required by the administrative routes.
	pub access_token: SecretString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	/// Environment only.
	#[serde(skip)]
	pub access_token: Option<SecretString>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.access_token.is_some() {
			self.access_token = other.access_token;
		}
	}

	pub fn finalize(self) -> Result<AuthConfig, ConfigError> {
		let access_token = self
			.access_token
			.ok_or_else(|| ConfigError::MissingEnvVar("IMGSTORE_SERVER_ACCESS_TOKEN".to_string()))?;
		if access_token.is_empty() {
			return Err(ConfigError::Validation(
				"IMGSTORE_SERVER_ACCESS_TOKEN must not be empty".to_string(),
			));
		}
		Ok(AuthConfig { access_token })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_token_is_an_error() {
		assert!(matches!(
			AuthConfigLayer::default().finalize(),
			Err(ConfigError::MissingEnvVar(_))
		));
	}

	#[test]
	fn test_empty_token_is_rejected() {
		let layer = AuthConfigLayer {
			access_token: Some("".into()),
		};
		assert!(matches!(layer.finalize(), Err(ConfigError::Validation(_))));
	}
}
