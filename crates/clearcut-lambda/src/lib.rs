//! Clearcut Lambda
//!
//! AWS Lambda function that removes image backgrounds. S3 upload
//! notifications for objects under `remove-bg/` are fetched, sent through
//! PhotoRoom's segmentation API, and written back under `clean/` as PNG.

pub mod handler;
pub mod telemetry;

// Re-export commonly used types
pub use handler::{function_handler, AckResponse, EventProcessor};
