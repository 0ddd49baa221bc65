// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Stateless capability tokens.
//!
//! A capability token is a compact HS256 JWS carrying a permission list, an
//! expiry and an opaque JSON payload. Signing keys are never stored: each one
//! is derived with HKDF-SHA256 from a single root secret and the index of the
//! current rotation window. Verification accepts the current and the previous
//! window's key, so a token stays verifiable across exactly one rotation.
//!
//! ```text
//! root secret ──HKDF(salt = window)──▶ SigningKey(window)
//!                                     SigningKey(window - 1)
//! ```

pub mod claims;
pub mod clock;
pub mod error;
pub mod expiration;
pub mod keys;
pub mod rotation;
pub mod service;

pub use claims::{Claims, IssuedAt, Permission, TokenRequest, ISSUER};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TokenError;
pub use expiration::Expiration;
pub use keys::{derive_key, SigningKey, KEY_LEN};
pub use rotation::{window_index, RotatingSecretCache, SecretPair, DEFAULT_WINDOW};
pub use service::CapabilityTokenService;
