// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Minting and verifying capability tokens.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::claims::{Claims, IssuedAt, Permission, TokenRequest, ISSUER};
use crate::error::TokenError;
use crate::rotation::RotatingSecretCache;

/// Signs tokens with the current window key and verifies them against the
/// current or previous one.
#[derive(Debug, Clone)]
pub struct CapabilityTokenService {
	secrets: Arc<RotatingSecretCache>,
	validation: Validation,
}

impl CapabilityTokenService {
	pub fn new(secrets: Arc<RotatingSecretCache>) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.set_issuer(&[ISSUER]);
		validation.set_required_spec_claims(&["exp", "iat", "iss"]);
		// Expiry is checked against the cache's clock, not the system clock.
		validation.validate_exp = false;
		validation.leeway = 0;

		Self {
			secrets,
			validation,
		}
	}

	pub fn secrets(&self) -> &Arc<RotatingSecretCache> {
		&self.secrets
	}

	#[instrument(skip(self, request), fields(permissions = ?request.permissions))]
	pub async fn sign<T>(&self, request: TokenRequest<T>, issued_at: IssuedAt) -> Result<String, TokenError>
	where
		T: Serialize,
	{
		let now = self.secrets.clock().now();
		let (iat, exp) = issued_at.timestamps(now, &request.expiration);
		let claims = Claims {
			iss: ISSUER.to_string(),
			iat,
			exp,
			permissions: request
				.permissions
				.iter()
				.map(|p| p.as_str().to_string())
				.collect(),
			data: request.data,
		};

		let pair = self.secrets.secret_pair().await;
		let token = encode(
			&Header::new(Algorithm::HS256),
			&claims,
			&EncodingKey::from_secret(pair.current.as_bytes()),
		)
		.map_err(|e| TokenError::Signing(e.to_string()))?;

		debug!(window = pair.window, iat, exp, "signed capability token");
		Ok(token)
	}

	/// Verify `token` and check that it grants every permission in `required`.
	///
	/// The current window key is tried first, then the previous one. Expired,
	/// malformed, wrongly signed or foreign-issuer tokens all fail with
	/// [`TokenError::InvalidToken`]; a valid token lacking a permission fails
	/// with [`TokenError::InsufficientPermissions`] whatever its payload; a
	/// granting token whose payload does not decode as `T` is invalid.
	#[instrument(skip(self, token))]
	pub async fn verify<T>(&self, token: &str, required: &[Permission]) -> Result<Claims<T>, TokenError>
	where
		T: DeserializeOwned,
	{
		let pair = self.secrets.secret_pair().await;

		let mut last_error = None;
		let mut verified = None;
		for (label, key) in [("current", &pair.current), ("previous", &pair.previous)] {
			match decode::<Claims<serde_json::Value>>(token, &DecodingKey::from_secret(key.as_bytes()), &self.validation) {
				Ok(data) => {
					debug!(key = label, window = pair.window, "capability token signature verified");
					verified = Some(data.claims);
					break;
				}
				Err(e) => last_error = Some(e),
			}
		}

		let claims = match verified {
			Some(claims) => claims,
			None => {
				let reason = last_error
					.map(|e| e.to_string())
					.unwrap_or_else(|| "no verification key".to_string());
				warn!(error = %reason, "rejected capability token");
				return Err(TokenError::InvalidToken(reason));
			}
		};

		let now = self.secrets.clock().now().timestamp();
		if now >= claims.exp {
			warn!(exp = claims.exp, now, "rejected expired capability token");
			return Err(TokenError::InvalidToken("token has expired".to_string()));
		}

		let missing = claims.missing_permissions(required);
		if !missing.is_empty() {
			warn!(?missing, "capability token lacks required permissions");
			return Err(TokenError::InsufficientPermissions {
				missing,
				granted: claims.permissions,
			});
		}

		// Payload shape is only checked once the token is known to grant the
		// operation, so a token for another operation reports the permission.
		let data = serde_json::from_value::<T>(claims.data).map_err(|e| {
			warn!(error = %e, "capability token payload has the wrong shape");
			TokenError::InvalidToken(format!("invalid token payload: {e}"))
		})?;

		Ok(Claims {
			iss: claims.iss,
			iat: claims.iat,
			exp: claims.exp,
			permissions: claims.permissions,
			data,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use crate::expiration::Expiration;
	use crate::rotation::DEFAULT_WINDOW;
	use chrono::{DateTime, TimeZone, Utc};
	use imgstore_common_secret::SecretString;
	use proptest::prelude::*;
	use serde::Deserialize;
	use std::time::Duration;

	#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
	struct Payload {
		filename: String,
		options: String,
	}

	fn service_with_clock(root: &str, start: DateTime<Utc>) -> (CapabilityTokenService, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(start));
		let secrets = Arc::new(RotatingSecretCache::new(
			&SecretString::new(root.to_string()),
			DEFAULT_WINDOW,
			clock.clone(),
		));
		(CapabilityTokenService::new(secrets), clock)
	}

	fn start() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 5, 20, 10, 0, 0).unwrap()
	}

	fn transform_request(expiration: Expiration) -> TokenRequest<Payload> {
		TokenRequest {
			permissions: vec![Permission::FileTransform],
			expiration,
			data: Payload {
				filename: "image/abc/cat.png".to_string(),
				options: "rs:fill:300:300".to_string(),
			},
		}
	}

	#[tokio::test]
	async fn sign_then_verify_returns_payload() {
		let (service, _clock) = service_with_clock("root", start());
		let token = service
			.sign(transform_request(Expiration::hours(24)), IssuedAt::Exact)
			.await
			.unwrap();

		assert_eq!(token.split('.').count(), 3);

		let claims: Claims<Payload> = service
			.verify(&token, &[Permission::FileTransform])
			.await
			.unwrap();
		assert_eq!(claims.iss, ISSUER);
		assert_eq!(claims.iat, start().timestamp());
		assert_eq!(claims.exp, start().timestamp() + 24 * 60 * 60);
		assert_eq!(claims.data.filename, "image/abc/cat.png");
	}

	#[tokio::test]
	async fn token_survives_exactly_one_rotation() {
		let (service, clock) = service_with_clock("root", start());
		let token = service
			.sign(transform_request(Expiration::In(Duration::from_secs(90 * 24 * 60 * 60))), IssuedAt::Exact)
			.await
			.unwrap();

		clock.advance(DEFAULT_WINDOW);
		assert!(service
			.verify::<Payload>(&token, &[Permission::FileTransform])
			.await
			.is_ok());

		clock.advance(DEFAULT_WINDOW);
		let err = service
			.verify::<Payload>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(_)));
	}

	#[tokio::test]
	async fn expired_token_is_invalid() {
		let (service, clock) = service_with_clock("root", start());
		let token = service
			.sign(transform_request(Expiration::minutes(5)), IssuedAt::Exact)
			.await
			.unwrap();

		clock.advance(Duration::from_secs(4 * 60));
		assert!(service
			.verify::<Payload>(&token, &[Permission::FileTransform])
			.await
			.is_ok());

		clock.advance(Duration::from_secs(60));
		let err = service
			.verify::<Payload>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(ref m) if m.contains("expired")));
	}

	#[tokio::test]
	async fn missing_permission_is_rejected_after_valid_signature() {
		let (service, _clock) = service_with_clock("root", start());
		let token = service
			.sign(
				TokenRequest {
					permissions: vec![Permission::FileUpload],
					expiration: Expiration::minutes(5),
					data: serde_json::json!({}),
				},
				IssuedAt::Exact,
			)
			.await
			.unwrap();

		let err = service
			.verify::<serde_json::Value>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		match err {
			TokenError::InsufficientPermissions { missing, granted } => {
				assert_eq!(missing, vec!["file:transform".to_string()]);
				assert_eq!(granted, vec!["file:upload".to_string()]);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn upload_grant_redeemed_as_transform_is_forbidden() {
		let (service, _clock) = service_with_clock("root", start());
		let token = service
			.sign(
				TokenRequest {
					permissions: vec![Permission::FileUpload],
					expiration: Expiration::minutes(5),
					data: serde_json::json!({}),
				},
				IssuedAt::Exact,
			)
			.await
			.unwrap();

		let err = service
			.verify::<Payload>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InsufficientPermissions { .. }));
	}

	#[tokio::test]
	async fn granting_token_with_wrong_payload_is_invalid() {
		let (service, _clock) = service_with_clock("root", start());
		let token = service
			.sign(
				TokenRequest {
					permissions: vec![Permission::FileTransform],
					expiration: Expiration::minutes(5),
					data: serde_json::json!({ "filename": 7 }),
				},
				IssuedAt::Exact,
			)
			.await
			.unwrap();

		let err = service
			.verify::<Payload>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(ref m) if m.contains("payload")));
	}

	#[tokio::test]
	async fn foreign_root_secret_is_invalid_not_forbidden() {
		let (issuer, _) = service_with_clock("root-a", start());
		let (verifier, _) = service_with_clock("root-b", start());
		let token = issuer
			.sign(transform_request(Expiration::hours(1)), IssuedAt::Exact)
			.await
			.unwrap();

		let err = verifier
			.verify::<Payload>(&token, &[Permission::FileUpload])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(_)));
	}

	#[tokio::test]
	async fn tampered_payload_is_invalid() {
		let (service, _clock) = service_with_clock("root", start());
		let token = service
			.sign(transform_request(Expiration::hours(1)), IssuedAt::Exact)
			.await
			.unwrap();

		let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
		let (other, _) = service_with_clock("root", start());
		let forged = other
			.sign(
				TokenRequest {
					permissions: vec![Permission::FileTransform, Permission::FileUpload],
					expiration: Expiration::hours(1),
					data: Payload {
						filename: "image/other/secret.png".to_string(),
						options: String::new(),
					},
				},
				IssuedAt::Exact,
			)
			.await
			.unwrap();
		parts[1] = forged.split('.').nth(1).unwrap().to_string();

		let err = service
			.verify::<Payload>(&parts.join("."), &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(_)));
	}

	#[tokio::test]
	async fn other_algorithms_are_rejected() {
		let (service, _clock) = service_with_clock("root", start());
		let pair = service.secrets().secret_pair().await;
		let claims = Claims {
			iss: ISSUER.to_string(),
			iat: start().timestamp(),
			exp: start().timestamp() + 3600,
			permissions: vec!["file:transform".to_string()],
			data: serde_json::json!({}),
		};
		let token = encode(
			&Header::new(Algorithm::HS512),
			&claims,
			&EncodingKey::from_secret(pair.current.as_bytes()),
		)
		.unwrap();

		let err = service
			.verify::<serde_json::Value>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(_)));
	}

	#[tokio::test]
	async fn foreign_issuer_is_rejected() {
		let (service, _clock) = service_with_clock("root", start());
		let pair = service.secrets().secret_pair().await;
		let claims = Claims {
			iss: "someone-else".to_string(),
			iat: start().timestamp(),
			exp: start().timestamp() + 3600,
			permissions: vec!["file:transform".to_string()],
			data: serde_json::json!({}),
		};
		let token = encode(
			&Header::new(Algorithm::HS256),
			&claims,
			&EncodingKey::from_secret(pair.current.as_bytes()),
		)
		.unwrap();

		let err = service
			.verify::<serde_json::Value>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(_)));
	}

	#[tokio::test]
	async fn token_without_exp_is_rejected() {
		#[derive(Serialize)]
		struct NoExpiry {
			iss: &'static str,
			iat: i64,
			permissions: Vec<&'static str>,
			data: serde_json::Value,
		}

		let (service, _clock) = service_with_clock("root", start());
		let pair = service.secrets().secret_pair().await;
		let token = encode(
			&Header::new(Algorithm::HS256),
			&NoExpiry {
				iss: ISSUER,
				iat: start().timestamp(),
				permissions: vec!["file:transform"],
				data: serde_json::json!({}),
			},
			&EncodingKey::from_secret(pair.current.as_bytes()),
		)
		.unwrap();

		let err = service
			.verify::<serde_json::Value>(&token, &[Permission::FileTransform])
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidToken(_)));
	}

	#[tokio::test]
	async fn same_day_loose_tokens_are_identical() {
		let morning = Utc.with_ymd_and_hms(2025, 5, 20, 8, 0, 0).unwrap();
		let (service, clock) = service_with_clock("root", morning);

		let first = service
			.sign(transform_request(Expiration::hours(24)), IssuedAt::StartOfDay)
			.await
			.unwrap();
		clock.set(Utc.with_ymd_and_hms(2025, 5, 20, 17, 45, 12).unwrap());
		let second = service
			.sign(transform_request(Expiration::hours(24)), IssuedAt::StartOfDay)
			.await
			.unwrap();
		assert_eq!(first, second);

		clock.set(Utc.with_ymd_and_hms(2025, 5, 21, 0, 0, 1).unwrap());
		let next_day = service
			.sign(transform_request(Expiration::hours(24)), IssuedAt::StartOfDay)
			.await
			.unwrap();
		assert_ne!(first, next_day);
	}

	#[tokio::test]
	async fn exact_tokens_differ_across_seconds() {
		let (service, clock) = service_with_clock("root", start());
		let first = service
			.sign(transform_request(Expiration::hours(24)), IssuedAt::Exact)
			.await
			.unwrap();
		clock.advance(Duration::from_secs(1));
		let second = service
			.sign(transform_request(Expiration::hours(24)), IssuedAt::Exact)
			.await
			.unwrap();
		assert_ne!(first, second);
	}

	proptest! {
		#[test]
		fn roundtrip_preserves_payload(
			filename in "[a-zA-Z0-9/_.-]{1,64}",
			options in "[a-z0-9:/]{0,64}",
			offset_secs in 0u64..(14 * 24 * 60 * 60),
		) {
			let (service, clock) = service_with_clock("root", start());
			clock.advance(Duration::from_secs(offset_secs));
			let payload = Payload { filename, options };

			let claims: Claims<Payload> = tokio_test::block_on(async {
				let token = service
					.sign(
						TokenRequest {
							permissions: vec![Permission::FileTransform],
							expiration: Expiration::hours(24),
							data: payload.clone(),
						},
						IssuedAt::Exact,
					)
					.await
					.unwrap();
				service.verify(&token, &[Permission::FileTransform]).await.unwrap()
			});

			prop_assert_eq!(claims.data, payload);
		}
	}
}
