// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the imgstore server.
//!
//! - Layered sources: defaults, TOML file, environment
//! - `IMGSTORE_SERVER_*` environment variables
//! - Secrets only from the environment (`VAR` or `VAR_FILE`)
//!
//! ```ignore
//! use imgstore_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use std::path::PathBuf;

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub storage: StorageConfig,
	pub imgproxy: ImgproxyConfig,
	pub auth: AuthConfig,
	pub tokens: TokensConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`IMGSTORE_SERVER_*`)
/// 2. Config file (`/etc/imgstore/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Like [`load_config`] with a different config file.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer, applying defaults and validation.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let storage = layer.storage.unwrap_or_default().finalize()?;
	let imgproxy = layer.imgproxy.unwrap_or_default().finalize()?;
	let auth = layer.auth.unwrap_or_default().finalize()?;
	let tokens = layer.tokens.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&tokens)?;

	info!(
		host = %http.host,
		port = http.port,
		storage_backend = ?storage.backend,
		public_base_url = %storage.public_base_url,
		imgproxy_endpoint = %imgproxy.endpoint,
		rotation_window = %humantime::format_duration(tokens.rotation_window),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		storage,
		imgproxy,
		auth,
		tokens,
		logging,
	})
}

/// Cross-field rules.
fn validate_config(tokens: &TokensConfig) -> Result<(), ConfigError> {
	// A token must stay verifiable for its whole life, and verification only
	// reaches back one window.
	let longest_ttl = tokens.transform_ttl.max(tokens.upload_ttl);
	if longest_ttl > tokens.rotation_window {
		return Err(ConfigError::Validation(format!(
			"token lifetime {} exceeds the key rotation window {}",
			humantime::format_duration(longest_ttl),
			humantime::format_duration(tokens.rotation_window),
		)));
	}
	Ok(())
}
