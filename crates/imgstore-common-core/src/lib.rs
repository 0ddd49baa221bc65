// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Core types shared across imgstore crates.

pub mod error;

pub use error::{ClassifiedError, ErrorKind, PublicError};
