// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with a consistent User-Agent header.
//!
//! The transform pipeline deliberately imposes no request timeout of its own;
//! callers that want one use [`builder`] and set it explicitly.

mod client;

pub use client::{builder, new_client, user_agent};
