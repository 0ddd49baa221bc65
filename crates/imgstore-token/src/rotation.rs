// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Memoized current/previous key pair for the active rotation window.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use imgstore_common_secret::{Secret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::keys::{derive_key, SigningKey};

/// Default rotation window: two weeks.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Keys for `window` and `window - 1`.
#[derive(Debug, Clone)]
pub struct SecretPair {
	pub window: i64,
	pub current: SigningKey,
	pub previous: SigningKey,
}

/// Index of the rotation window containing `now`.
pub fn window_index(now: DateTime<Utc>, window_length: Duration) -> i64 {
	now.timestamp_millis().div_euclid(window_length_ms(window_length))
}

fn window_length_ms(window_length: Duration) -> i64 {
	i64::try_from(window_length.as_millis()).unwrap_or(i64::MAX).max(1)
}

/// Derives and caches the signing keys for the current window.
///
/// Constructed once at startup and shared behind an `Arc`. The pair is
/// rederived lazily the first time it is requested in a new window. Two
/// callers refreshing at once derive identical keys, so the race is benign.
pub struct RotatingSecretCache {
	root_secret: Secret<Vec<u8>>,
	window_length: Duration,
	clock: Arc<dyn Clock>,
	pair: RwLock<Option<Arc<SecretPair>>>,
}

impl RotatingSecretCache {
	pub fn new(root_secret: &SecretString, window_length: Duration, clock: Arc<dyn Clock>) -> Self {
		Self {
			root_secret: Secret::new(root_secret.expose().as_bytes().to_vec()),
			window_length,
			clock,
			pair: RwLock::new(None),
		}
	}

	pub fn clock(&self) -> &Arc<dyn Clock> {
		&self.clock
	}

	pub fn window_length(&self) -> Duration {
		self.window_length
	}

	pub fn current_window(&self) -> i64 {
		window_index(self.clock.now(), self.window_length)
	}

	/// The pair for the current window, deriving it if the memoized pair is
	/// stale or missing.
	pub async fn secret_pair(&self) -> Arc<SecretPair> {
		let window = self.current_window();
		if let Some(pair) = self.pair.read().await.as_ref() {
			if pair.window == window {
				return Arc::clone(pair);
			}
		}
		self.refresh_window(window).await
	}

	/// Unconditionally rederive the pair for the current window.
	pub async fn refresh(&self) -> Arc<SecretPair> {
		let window = self.current_window();
		self.refresh_window(window).await
	}

	async fn refresh_window(&self, window: i64) -> Arc<SecretPair> {
		let root = self.root_secret.expose();
		let pair = Arc::new(SecretPair {
			window,
			current: derive_key(root, window),
			previous: derive_key(root, window.saturating_sub(1)),
		});

		let mut slot = self.pair.write().await;
		let previous_window = slot.as_ref().map(|p| p.window);
		*slot = Some(Arc::clone(&pair));
		drop(slot);

		match previous_window {
			Some(prev) if prev != window => {
				info!(window, previous_window = prev, "rotated capability token keys")
			}
			Some(_) => debug!(window, "refreshed capability token keys"),
			None => debug!(window, "derived capability token keys"),
		}
		pair
	}
}

impl std::fmt::Debug for RotatingSecretCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RotatingSecretCache")
			.field("root_secret", &self.root_secret)
			.field("window_length", &self.window_length)
			.finish_non_exhaustive()
	}
}
