//! Clearcut Storage Library
//!
//! This crate provides the object-storage abstraction used by the Clearcut
//! pipeline. It includes the Storage trait and implementations for S3 and the
//! local filesystem.
//!
//! # Addressing
//!
//! Objects are addressed by `(bucket, key)` pairs as delivered in S3 event
//! notifications. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clearcut_core::StorageBackend;
pub use factory::create_storage;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
