// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by the imgstore crates.
//!
//! - [`Secret<T>`] re-exported from [`imgstore_common_secret`]
//! - [`load_secret_env`] / [`require_secret_env`] for the `VAR` / `VAR_FILE`
//!   convention used by container secret mounts

pub mod env;

pub use imgstore_common_secret::{Secret, SecretString, REDACTED};

pub use env::{load_secret_env, require_secret_env, RequiredSecretError, SecretEnvError};
