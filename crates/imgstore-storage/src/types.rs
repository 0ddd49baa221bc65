// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// HTTP-facing metadata persisted next to an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_control: Option<String>,
}

impl ObjectMetadata {
	pub fn with_content_type(content_type: Option<String>) -> Self {
		Self {
			content_type,
			cache_control: None,
		}
	}
}

/// Result of a `head` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
	pub key: String,
	pub size: u64,
	pub metadata: ObjectMetadata,
}

/// Object body together with its metadata.
#[derive(Debug, Clone)]
pub struct StoredObject {
	pub info: ObjectInfo,
	pub body: Bytes,
}

impl StoredObject {
	pub fn content_type(&self) -> Option<&str> {
		self.info.metadata.content_type.as_deref()
	}
}
