// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! imgstore gateway binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use imgstore_server::{create_app_state, create_router, telemetry};
use tower_http::trace::TraceLayer;

mod version;

/// imgstore-server - token-gated image uploads and transforms.
#[derive(Parser, Debug)]
#[command(name = "imgstore-server", about = "Image storage gateway", version)]
struct Args {
	/// Config file to read instead of /etc/imgstore/server.toml
	#[arg(long, env = "IMGSTORE_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => imgstore_server_config::load_config_with_file(path)?,
		None => imgstore_server_config::load_config()?,
	};

	telemetry::init_tracing(&config.logging);

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		storage_backend = ?config.storage.backend,
		"starting imgstore-server"
	);

	let state = create_app_state(&config).await?;
	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	Ok(())
}
