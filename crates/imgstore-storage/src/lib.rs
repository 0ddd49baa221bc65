// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Blob storage for uploaded images and cached transforms.
//!
//! Objects are addressed by slash-separated string keys
//! (`image/{id}/{filename}`, `cache/{digest}`) and are never mutated in place:
//! a `put` either creates an object or replaces it wholesale.

pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod store;
pub mod types;

pub use error::StorageError;
pub use fs::FsBlobStore;
pub use key::validate_key;
pub use memory::MemoryBlobStore;
pub use store::BlobStore;
pub use types::{ObjectInfo, ObjectMetadata, StoredObject};
