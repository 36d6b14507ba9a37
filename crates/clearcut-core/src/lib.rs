//! Clearcut Core Library
//!
//! This crate provides configuration, constants, and object-key logic shared
//! across the Clearcut background-removal pipeline.

pub mod config;
pub mod constants;
pub mod keys;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use storage_types::StorageBackend;
