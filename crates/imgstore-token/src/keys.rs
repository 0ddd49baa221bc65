// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Per-window key derivation.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Length of a derived HS256 key in bytes.
pub const KEY_LEN: usize = 32;

const KEY_INFO: &[u8] = b"imgstore/capability-token/v1";

/// HS256 key for one rotation window. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Zeroizing<[u8; KEY_LEN]>);

impl SigningKey {
	pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
		&self.0
	}
}

impl fmt::Debug for SigningKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SigningKey([REDACTED])")
	}
}

/// Derive the signing key for `window` from `root_secret`.
///
/// HKDF-SHA256 with the decimal window index as salt and a fixed info string.
/// Pure: the same inputs always give the same key.
pub fn derive_key(root_secret: &[u8], window: i64) -> SigningKey {
	let salt = window.to_string();
	let hkdf = Hkdf::<Sha256>::new(Some(salt.as_bytes()), root_secret);
	let mut okm = Zeroizing::new([0u8; KEY_LEN]);
	hkdf.expand(KEY_INFO, &mut okm[..])
		.expect("32 bytes is a valid HKDF-SHA256 output length");
	SigningKey(okm)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn adjacent_windows_get_distinct_keys() {
		let a = derive_key(b"root", 1400);
		let b = derive_key(b"root", 1401);
		assert_ne!(a, b);
	}

	#[test]
	fn debug_does_not_leak_key_bytes() {
		let key = derive_key(b"root", 7);
		assert_eq!(format!("{key:?}"), "SigningKey([REDACTED])");
	}

	proptest! {
		#[test]
		fn derivation_is_deterministic(root in proptest::collection::vec(any::<u8>(), 1..64), window in any::<i64>()) {
			prop_assert_eq!(derive_key(&root, window), derive_key(&root, window));
		}

		#[test]
		fn different_roots_give_different_keys(window in 0i64..10_000) {
			prop_assert_ne!(derive_key(b"root-a", window), derive_key(b"root-b", window));
		}
	}
}
