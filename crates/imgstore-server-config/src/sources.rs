// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and the environment.

use std::path::PathBuf;

use imgstore_common_config::{load_secret_env, SecretString};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, HttpConfigLayer, ImgproxyConfigLayer, LoggingConfigLayer, StorageConfigLayer,
	TokensConfigLayer,
};

/// Default location of the config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/imgstore/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `IMGSTORE_SERVER_<FIELD>`. Secrets honour the `<VAR>_FILE`
/// indirection.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			storage: Some(load_storage_from_env()?),
			imgproxy: Some(load_imgproxy_from_env()?),
			auth: Some(load_auth_from_env()?),
			tokens: Some(load_tokens_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|e| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid value '{v}': {e}"),
		}),
		None => Ok(None),
	}
}

fn secret(name: &str) -> Result<Option<SecretString>, ConfigError> {
	load_secret_env(name).map_err(|e| ConfigError::Secret(e.to_string()))
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("IMGSTORE_SERVER_HOST"),
		port: env_parse("IMGSTORE_SERVER_PORT")?,
	})
}

fn load_storage_from_env() -> Result<StorageConfigLayer, ConfigError> {
	Ok(StorageConfigLayer {
		backend: env_parse("IMGSTORE_SERVER_STORAGE_BACKEND")?,
		root: env_var("IMGSTORE_SERVER_STORAGE_ROOT").map(PathBuf::from),
		public_base_url: env_var("IMGSTORE_SERVER_PUBLIC_BASE_URL"),
	})
}

fn load_imgproxy_from_env() -> Result<ImgproxyConfigLayer, ConfigError> {
	Ok(ImgproxyConfigLayer {
		endpoint: env_var("IMGSTORE_SERVER_IMGPROXY_ENDPOINT"),
		key: secret("IMGSTORE_SERVER_IMGPROXY_KEY")?,
		salt: secret("IMGSTORE_SERVER_IMGPROXY_SALT")?,
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		access_token: secret("IMGSTORE_SERVER_ACCESS_TOKEN")?,
	})
}

fn load_tokens_from_env() -> Result<TokensConfigLayer, ConfigError> {
	Ok(TokensConfigLayer {
		secret: secret("IMGSTORE_SERVER_TOKEN_SECRET")?,
		rotation_window: env_var("IMGSTORE_SERVER_TOKEN_ROTATION_WINDOW"),
		transform_ttl: env_var("IMGSTORE_SERVER_TRANSFORM_TOKEN_TTL"),
		upload_ttl: env_var("IMGSTORE_SERVER_UPLOAD_TOKEN_TTL"),
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("IMGSTORE_SERVER_LOG_LEVEL"),
		json: env_bool("IMGSTORE_SERVER_LOG_JSON"),
	}
}
