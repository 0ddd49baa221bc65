// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::expiration::Expiration;

/// `iss` claim of every token this service mints and accepts.
pub const ISSUER: &str = "imgstore";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Operations a capability token can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
	#[serde(rename = "file:transform")]
	FileTransform,
	#[serde(rename = "file:upload")]
	FileUpload,
}

impl Permission {
	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::FileTransform => "file:transform",
			Permission::FileUpload => "file:upload",
		}
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Registered claims plus the caller's payload.
///
/// Permissions are kept as strings so tokens carrying permissions this build
/// does not know still verify; they simply never satisfy a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims<T> {
	pub iss: String,
	/// Seconds since the epoch.
	pub iat: i64,
	/// Seconds since the epoch.
	pub exp: i64,
	#[serde(default)]
	pub permissions: Vec<String>,
	pub data: T,
}

impl<T> Claims<T> {
	pub fn has_permission(&self, permission: Permission) -> bool {
		self.permissions.iter().any(|p| p == permission.as_str())
	}

	/// Required permissions absent from this token.
	pub fn missing_permissions(&self, required: &[Permission]) -> Vec<String> {
		required
			.iter()
			.filter(|p| !self.has_permission(**p))
			.map(|p| p.as_str().to_string())
			.collect()
	}

	pub fn issued_at(&self) -> Option<DateTime<Utc>> {
		DateTime::from_timestamp(self.iat, 0)
	}

	pub fn expires_at(&self) -> Option<DateTime<Utc>> {
		DateTime::from_timestamp(self.exp, 0)
	}
}

/// How the `iat` claim is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssuedAt {
	/// The current second.
	#[default]
	Exact,
	/// UTC midnight of the current day.
	///
	/// A relative expiration is measured from that midnight, rounded up to a
	/// midnight and extended by one day, so every request with the same inputs
	/// on the same day yields the same token and each token lives at least the
	/// requested duration.
	StartOfDay,
}

impl IssuedAt {
	/// `(iat, exp)` in seconds for a token minted at `now`.
	pub fn timestamps(self, now: DateTime<Utc>, expiration: &Expiration) -> (i64, i64) {
		let now_secs = now.timestamp();
		match self {
			IssuedAt::Exact => (now_secs, expiration.resolve(now).timestamp()),
			IssuedAt::StartOfDay => {
				let iat = floor_day(now_secs);
				let exp = match expiration {
					Expiration::In(_) => {
						let start = DateTime::from_timestamp(iat, 0).unwrap_or(now);
						ceil_day(expiration.resolve(start).timestamp()).saturating_add(SECONDS_PER_DAY)
					}
					Expiration::At(at) => at.timestamp(),
				};
				(iat, exp)
			}
		}
	}
}

fn floor_day(secs: i64) -> i64 {
	secs - secs.rem_euclid(SECONDS_PER_DAY)
}

fn ceil_day(secs: i64) -> i64 {
	let floor = floor_day(secs);
	if floor == secs {
		secs
	} else {
		floor.saturating_add(SECONDS_PER_DAY)
	}
}

/// What to put in a new token.
#[derive(Debug, Clone)]
pub struct TokenRequest<T> {
	pub permissions: Vec<Permission>,
	pub expiration: Expiration,
	pub data: T,
}
