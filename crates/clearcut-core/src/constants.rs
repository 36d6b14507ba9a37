//! Pipeline-wide constants.
//!
//! Prefixes, extensions, output format, and background color are fixed by the
//! pipeline's contract and are deliberately not configurable.

/// Key prefix designating objects eligible for background removal.
pub const INPUT_PREFIX: &str = "remove-bg/";

/// Key prefix under which processed results are written (no trailing slash).
pub const OUTPUT_PREFIX: &str = "clean";

/// Image extensions accepted for processing, lowercase, without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Base URL of the PhotoRoom segmentation API.
pub const PHOTOROOM_API_BASE: &str = "https://sdk.photoroom.com";

/// Output format requested from the segmentation API.
pub const OUTPUT_FORMAT: &str = "png";

/// Background color requested from the segmentation API.
pub const BACKGROUND_COLOR: &str = "white";

/// Content type of every processed object.
pub const OUTPUT_CONTENT_TYPE: &str = "image/png";

/// Processor identity recorded on processed objects.
pub const PROCESSOR_TAG: &str = "clearcut-lambda";

/// Metadata field holding the source object key.
pub const METADATA_ORIGINAL_FILE: &str = "original-file";

/// Metadata field holding the processor identity.
pub const METADATA_PROCESSED_BY: &str = "processed-by";

/// Metadata field holding the processing timestamp (RFC 3339).
pub const METADATA_PROCESSING_DATE: &str = "processing-date";
