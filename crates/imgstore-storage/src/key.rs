// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Object key validation.

use crate::error::StorageError;

/// Reject keys that could escape a directory-backed store or that no
/// adapter can represent.
///
/// A valid key is non-empty, relative, uses `/` as the only separator and has
/// no empty, `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
	if key.is_empty() {
		return Err(StorageError::invalid_key(key, "key is empty"));
	}
	if key.starts_with('/') {
		return Err(StorageError::invalid_key(key, "key must be relative"));
	}
	if key.contains('\\') || key.contains('\0') {
		return Err(StorageError::invalid_key(key, "key contains a forbidden character"));
	}
	for segment in key.split('/') {
		match segment {
			"" => return Err(StorageError::invalid_key(key, "key has an empty segment")),
			"." | ".." => {
				return Err(StorageError::invalid_key(key, "key has a relative segment"));
			}
			_ => {}
		}
	}
	Ok(())
}
