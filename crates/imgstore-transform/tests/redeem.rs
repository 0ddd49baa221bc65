// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use imgstore_common_core::{ClassifiedError, ErrorKind};
use imgstore_common_secret::SecretString;
use imgstore_storage::{BlobStore, MemoryBlobStore, ObjectMetadata};
use imgstore_token::{CapabilityTokenService, ManualClock, RotatingSecretCache, TokenError, DEFAULT_WINDOW};
use imgstore_transform::{CacheKey, TransformError, TransformService, TransformUrlSigner};
use imgstore_upload::UploadService;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "943b421c9eb07c830af81030552c86009268de4e532ba2ee2eab8247c6da0881";
const SALT: &str = "520f986b998545b4785e0defbc4f3c1203f22de2374a3d53cb7a7fe9fea309c5";
const PUBLIC: &str = "https://cdn.example.test";
const SOURCE: &str = "image/0b7d/cat.png";
const OPTIONS: &str = "rs:fill:64:64";

fn png() -> Vec<u8> {
	b"\x89PNG\r\n\x1a\nsource".to_vec()
}

struct Fixture {
	service: TransformService,
	tokens: CapabilityTokenService,
	store: Arc<MemoryBlobStore>,
	clock: Arc<ManualClock>,
	upstream: MockServer,
}

impl Fixture {
	async fn new() -> Self {
		let upstream = MockServer::start().await;
		let clock = Arc::new(ManualClock::new(
			Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap(),
		));
		let secrets = Arc::new(RotatingSecretCache::new(
			&SecretString::new("transform-tests".to_string()),
			DEFAULT_WINDOW,
			clock.clone(),
		));
		let tokens = CapabilityTokenService::new(secrets);
		let store = Arc::new(MemoryBlobStore::new());
		let signer = TransformUrlSigner::new(KEY, SALT, upstream.uri()).unwrap();
		let service = TransformService::new(
			tokens.clone(),
			store.clone(),
			signer,
			imgstore_common_http::new_client().unwrap(),
			PUBLIC,
		);

		Self {
			service,
			tokens,
			store,
			clock,
			upstream,
		}
	}

	/// Path the upstream should see for `SOURCE` + `OPTIONS`.
	fn signed_path(&self) -> String {
		let signer = TransformUrlSigner::new(KEY, SALT, self.upstream.uri()).unwrap();
		let url = signer.sign(&format!("{PUBLIC}/{SOURCE}"), OPTIONS);
		url.strip_prefix(&self.upstream.uri()).unwrap().to_string()
	}

	async fn put_source(&self) {
		self.store
			.put(
				SOURCE,
				png().into(),
				ObjectMetadata::with_content_type(Some("image/png".to_string())),
			)
			.await
			.unwrap();
	}

	async fn mount_transform(&self, response: ResponseTemplate, expected_calls: u64) {
		Mock::given(method("GET"))
			.and(path(self.signed_path()))
			.and(header("accept", "image/*"))
			.respond_with(response)
			.expect(expected_calls)
			.mount(&self.upstream)
			.await;
	}

	fn cache_object_key(&self) -> String {
		CacheKey::derive(SOURCE, OPTIONS).object_key()
	}
}

fn webp_response() -> ResponseTemplate {
	ResponseTemplate::new(200)
		.insert_header("content-type", "image/webp")
		.set_body_bytes(b"RIFF....WEBP".to_vec())
}

#[tokio::test]
async fn miss_fetches_and_stores_then_hits() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	fx.mount_transform(webp_response(), 1).await;

	let token = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();

	let first = fx.service.redeem(&token).await.unwrap();
	assert!(!first.hit);
	assert_eq!(first.object_key, fx.cache_object_key());
	assert_eq!(first.url, format!("{PUBLIC}/{}", fx.cache_object_key()));

	let cached = fx.store.get(&first.object_key).await.unwrap().unwrap();
	assert_eq!(cached.body.as_ref(), b"RIFF....WEBP");
	assert_eq!(cached.content_type(), Some("image/webp"));

	let second = fx.service.redeem(&token).await.unwrap();
	assert!(second.hit);
	assert_eq!(second.url, first.url);
}

#[tokio::test]
async fn cache_hit_never_calls_upstream() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	fx.store
		.put(
			&fx.cache_object_key(),
			b"cached".to_vec().into(),
			ObjectMetadata::default(),
		)
		.await
		.unwrap();
	fx.mount_transform(webp_response(), 0).await;

	let token = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();
	let pointer = fx.service.redeem(&token).await.unwrap();

	assert!(pointer.hit);
	assert_eq!(
		fx.store.get(&pointer.object_key).await.unwrap().unwrap().body.as_ref(),
		b"cached"
	);
}

#[tokio::test]
async fn missing_source_is_not_found_and_writes_nothing() {
	let fx = Fixture::new().await;
	fx.mount_transform(webp_response(), 0).await;

	let token = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();
	let err = fx.service.redeem(&token).await.unwrap_err();

	assert!(matches!(err, TransformError::NotFound { ref filename } if filename == SOURCE));
	assert_eq!(err.public().status.as_u16(), 404);
	assert!(fx.store.is_empty().await);
}

#[tokio::test]
async fn upstream_failure_is_reported_and_not_cached() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	fx.mount_transform(
		ResponseTemplate::new(500).set_body_string("invalid source image"),
		1,
	)
	.await;

	let token = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();
	let err = fx.service.redeem(&token).await.unwrap_err();

	match &err {
		TransformError::Upstream { status, body } => {
			assert_eq!(*status, 500);
			assert!(body.contains("invalid source image"));
		}
		other => panic!("unexpected error: {other:?}"),
	}
	assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
	assert!(!fx.store.exists(&fx.cache_object_key()).await.unwrap());
}

#[tokio::test]
async fn oversized_upstream_response_is_not_cached() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	fx.mount_transform(webp_response(), 1).await;

	let service = TransformService::new(
		fx.tokens.clone(),
		fx.store.clone(),
		TransformUrlSigner::new(KEY, SALT, fx.upstream.uri()).unwrap(),
		imgstore_common_http::new_client().unwrap(),
		PUBLIC,
	)
	.with_max_response_bytes(4);

	let token = service.generate_token(SOURCE, OPTIONS).await.unwrap();
	let err = service.redeem(&token).await.unwrap_err();

	assert!(matches!(err, TransformError::ResponseTooLarge { limit: 4 }));
	assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
	assert!(!fx.store.exists(&fx.cache_object_key()).await.unwrap());
}

#[tokio::test]
async fn expired_token_is_rejected() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	fx.mount_transform(webp_response(), 0).await;

	let token = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();
	fx.clock.advance(Duration::from_secs(3 * 24 * 60 * 60));

	let err = fx.service.redeem(&token).await.unwrap_err();
	assert!(matches!(err, TransformError::Token(TokenError::InvalidToken(_))));
	assert_eq!(err.public().status.as_u16(), 401);
}

#[tokio::test]
async fn transform_token_outlives_its_nominal_day() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	fx.mount_transform(webp_response(), 1).await;

	// Minted 2025-07-01 09:00 UTC; expires 2025-07-03 00:00 UTC.
	let token = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();

	fx.clock.advance(Duration::from_secs(38 * 60 * 60 + 59 * 60));
	assert!(fx.service.redeem(&token).await.is_ok());

	fx.clock.advance(Duration::from_secs(60));
	let err = fx.service.redeem(&token).await.unwrap_err();
	assert!(matches!(err, TransformError::Token(TokenError::InvalidToken(_))));
}

#[tokio::test]
async fn upload_token_cannot_redeem_a_transform() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	fx.mount_transform(webp_response(), 0).await;

	let uploads = UploadService::new(fx.tokens.clone(), fx.store.clone());
	let token = uploads.issue_token().await.unwrap();

	let err = fx.service.redeem(&token).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InsufficientPermissions);
	assert_eq!(err.public().status.as_u16(), 403);
}

#[tokio::test]
async fn concurrent_redemptions_converge() {
	let fx = Fixture::new().await;
	fx.put_source().await;
	Mock::given(method("GET"))
		.and(path(fx.signed_path()))
		.respond_with(webp_response())
		.expect(1..=2)
		.mount(&fx.upstream)
		.await;

	let token = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();
	let (a, b) = tokio::join!(fx.service.redeem(&token), fx.service.redeem(&token));
	let (a, b) = (a.unwrap(), b.unwrap());

	assert_eq!(a.url, b.url);
	assert_eq!(fx.store.keys().await, vec![fx.cache_object_key(), SOURCE.to_string()]);
	assert_eq!(
		fx.store.get(&a.object_key).await.unwrap().unwrap().body.as_ref(),
		b"RIFF....WEBP"
	);
}

#[tokio::test]
async fn same_day_generation_is_stable() {
	let fx = Fixture::new().await;
	let morning = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();
	fx.clock.advance(Duration::from_secs(8 * 60 * 60));
	let evening = fx.service.generate_token(SOURCE, OPTIONS).await.unwrap();
	assert_eq!(morning, evening);

	let other_options = fx.service.generate_token(SOURCE, "rs:fit:10:10").await.unwrap();
	assert_ne!(morning, other_options);
}

#[tokio::test]
async fn raw_object_returns_stored_bytes() {
	let fx = Fixture::new().await;
	fx.put_source().await;

	let object = fx.service.raw_object(SOURCE).await.unwrap();
	assert_eq!(object.body.as_ref(), png().as_slice());
	assert_eq!(object.content_type(), Some("image/png"));

	let err = fx.service.raw_object("image/none/x.png").await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotFound);
}
