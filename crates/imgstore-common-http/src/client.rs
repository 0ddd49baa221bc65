// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};

/// Creates a client with the standard imgstore User-Agent.
///
/// Building only fails when the TLS backend cannot initialise, which is a
/// deployment error rather than a request error.
pub fn new_client() -> reqwest::Result<Client> {
	builder().build()
}

/// Client builder preloaded with the imgstore User-Agent.
///
/// ```ignore
/// let client = imgstore_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// `imgstore/{crate version}`
pub fn user_agent() -> String {
	format!("imgstore/{}", env!("CARGO_PKG_VERSION"))
}
