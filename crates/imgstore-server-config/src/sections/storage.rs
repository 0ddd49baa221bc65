// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blob store selection and its public origin.

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_ROOT: &str = "/var/lib/imgstore";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	#[default]
	Fs,
	Memory,
}

impl std::str::FromStr for StorageBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"fs" | "filesystem" => Ok(StorageBackend::Fs),
			"memory" => Ok(StorageBackend::Memory),
			other => Err(format!("unknown storage backend '{other}', expected 'fs' or 'memory'")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
	pub backend: StorageBackend,
	/// Root directory for the `fs` backend.
	pub root: PathBuf,
	/// Origin that serves stored objects by key. Source images are handed to
	/// imgproxy from here and cache pointers are built on it.
	pub public_base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfigLayer {
	#[serde(default)]
	pub backend: Option<StorageBackend>,
	#[serde(default)]
	pub root: Option<PathBuf>,
	#[serde(default)]
	pub public_base_url: Option<String>,
}

impl StorageConfigLayer {
	pub fn merge(&mut self, other: StorageConfigLayer) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.root.is_some() {
			self.root = other.root;
		}
		if other.public_base_url.is_some() {
			self.public_base_url = other.public_base_url;
		}
	}

	pub fn finalize(self) -> Result<StorageConfig, ConfigError> {
		let public_base_url = self
			.public_base_url
			.ok_or_else(|| ConfigError::MissingEnvVar("IMGSTORE_SERVER_PUBLIC_BASE_URL".to_string()))?;
		Url::parse(&public_base_url)
			.map_err(|e| ConfigError::invalid("storage.public_base_url", e.to_string()))?;

		Ok(StorageConfig {
			backend: self.backend.unwrap_or_default(),
			root: self.root.unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
			public_base_url: public_base_url.trim_end_matches('/').to_string(),
		})
	}
}
