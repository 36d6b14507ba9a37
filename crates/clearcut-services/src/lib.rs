//! Clearcut Services Library
//!
//! This crate provides clients for the external services the Clearcut
//! pipeline calls. Currently that is the PhotoRoom segmentation API.

pub mod photoroom;

// Re-export commonly used types
pub use photoroom::{PhotoRoomClient, SegmentError};
