// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::TokenError;

/// When a token stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
	/// Relative to the token's issue time.
	In(Duration),
	/// An absolute instant.
	At(DateTime<Utc>),
}

impl Expiration {
	pub fn hours(hours: u64) -> Self {
		Expiration::In(Duration::from_secs(hours * 60 * 60))
	}

	pub fn minutes(minutes: u64) -> Self {
		Expiration::In(Duration::from_secs(minutes * 60))
	}

	/// Absolute expiry for a token issued at `from`. Saturates at the
	/// largest representable instant.
	pub fn resolve(&self, from: DateTime<Utc>) -> DateTime<Utc> {
		match self {
			Expiration::In(duration) => chrono::Duration::from_std(*duration)
				.ok()
				.and_then(|d| from.checked_add_signed(d))
				.unwrap_or(DateTime::<Utc>::MAX_UTC),
			Expiration::At(at) => *at,
		}
	}
}

impl FromStr for Expiration {
	type Err = TokenError;

	/// Accepts `humantime` durations (`"24h"`, `"5min"`, `"2weeks"`) or RFC 3339
	/// timestamps.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		if let Ok(duration) = humantime::parse_duration(trimmed) {
			return Ok(Expiration::In(duration));
		}
		DateTime::parse_from_rfc3339(trimmed)
			.map(|at| Expiration::At(at.with_timezone(&Utc)))
			.map_err(|_| TokenError::InvalidExpiration(s.to_string()))
	}
}

impl fmt::Display for Expiration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Expiration::In(duration) => write!(f, "{}", humantime::format_duration(*duration)),
			Expiration::At(at) => write!(f, "{}", at.to_rfc3339()),
		}
	}
}
