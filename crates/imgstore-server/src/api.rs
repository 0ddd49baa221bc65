// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	extract::DefaultBodyLimit,
	http::{header, Method},
	middleware::from_fn_with_state,
	routing::{get, post, put},
	Router,
};
use imgstore_common_secret::SecretString;
use imgstore_server_config::{ServerConfig, StorageBackend};
use imgstore_storage::{BlobStore, FsBlobStore, MemoryBlobStore};
use imgstore_token::{CapabilityTokenService, Expiration, RotatingSecretCache, SystemClock};
use imgstore_transform::{TransformService, TransformUrlSigner};
use imgstore_upload::UploadService;
use tower_http::cors::{Any, CorsLayer};

use crate::auth_middleware::require_access_token;
use crate::error::StartupError;
use crate::routes;

/// Largest multipart body accepted by `PUT /upload/{token}`, and largest
/// transformed image read back from imgproxy.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub transform: Arc<TransformService>,
	pub upload: Arc<UploadService>,
	pub access_token: Arc<SecretString>,
}

impl AppState {
	pub fn new(transform: TransformService, upload: UploadService, access_token: SecretString) -> Self {
		Self {
			transform: Arc::new(transform),
			upload: Arc::new(upload),
			access_token: Arc::new(access_token),
		}
	}
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState")
			.field("transform", &self.transform)
			.field("upload", &self.upload)
			.field("access_token", &self.access_token)
			.finish()
	}
}

/// Build the services described by `config`.
pub async fn create_app_state(config: &ServerConfig) -> Result<AppState, StartupError> {
	let store: Arc<dyn BlobStore> = match config.storage.backend {
		StorageBackend::Fs => Arc::new(FsBlobStore::open(&config.storage.root).await?),
		StorageBackend::Memory => {
			tracing::warn!("using in-memory blob store; objects are lost on restart");
			Arc::new(MemoryBlobStore::new())
		}
	};

	let secrets = Arc::new(RotatingSecretCache::new(
		&config.tokens.secret,
		config.tokens.rotation_window,
		Arc::new(SystemClock),
	));
	let tokens = CapabilityTokenService::new(secrets);

	let signer = TransformUrlSigner::new(
		config.imgproxy.key.expose(),
		config.imgproxy.salt.expose(),
		config.imgproxy.endpoint.clone(),
	)?;
	let http = imgstore_common_http::new_client()?;

	let transform = TransformService::new(
		tokens.clone(),
		Arc::clone(&store),
		signer,
		http,
		config.storage.public_base_url.clone(),
	)
	.with_token_expiration(Expiration::In(config.tokens.transform_ttl))
	.with_max_response_bytes(MAX_UPLOAD_BYTES);

	let upload = UploadService::new(tokens, store)
		.with_token_expiration(Expiration::In(config.tokens.upload_ttl));

	Ok(AppState::new(
		transform,
		upload,
		config.auth.access_token.clone(),
	))
}

/// CORS policy for browser clients: any origin, no credentials.
pub fn cors_layer() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([
			Method::GET,
			Method::POST,
			Method::PUT,
			Method::DELETE,
			Method::OPTIONS,
		])
		.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn create_router(state: AppState) -> Router {
	// Operator routes - bearer access token required
	let operator = Router::new()
		.route("/check", get(routes::check::check))
		.route("/transform/generate", post(routes::transform::generate))
		.route("/upload/create-token", post(routes::upload::create_token))
		.route("/raw/{*path}", get(routes::raw::raw))
		.route_layer(from_fn_with_state(state.clone(), require_access_token));

	// Capability routes - authorised by the token in the path
	let capability = Router::new()
		.route("/transform/{token}", get(routes::transform::redeem))
		.route(
			"/upload/{token}",
			put(routes::upload::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
		);

	Router::new()
		.merge(operator)
		.merge(capability)
		.with_state(state)
		.layer(cors_layer())
}
