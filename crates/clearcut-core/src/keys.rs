//! Object-key helpers
//!
//! S3 event notifications deliver object keys in URL-encoded form with spaces
//! rendered as `+`. Everything in this module operates on the decoded key.

use std::path::Path;

use crate::constants::{OUTPUT_PREFIX, SUPPORTED_EXTENSIONS};

/// Decodes an object key as delivered in an S3 event notification.
///
/// Notification payloads encode keys the way HTML forms do: spaces become `+`
/// and other reserved characters are percent-encoded. The `+` substitution has
/// to happen before percent-decoding so that a literal `%2B` survives.
pub fn decode_object_key(raw: &str) -> Result<String, anyhow::Error> {
    let plus_decoded = raw.replace('+', " ");
    let decoded = urlencoding::decode(&plus_decoded)
        .map_err(|_| anyhow::anyhow!("Object key is not valid UTF-8 after decoding: {}", raw))?;
    Ok(decoded.into_owned())
}

/// Returns the lowercased extension of a key, if it has one.
pub fn extension(key: &str) -> Option<String> {
    Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Whether the pipeline knows how to process objects with this extension.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&ext)
}

/// Derives the destination key for a processed object.
///
/// The stem keeps everything up to the final dot, so `remove-bg/archive.tar.png`
/// maps to `clean/archive.tar.png`. Extension matching is case-insensitive:
/// `remove-bg/photo.JPG` maps to `clean/photo.png`.
pub fn output_key(key: &str) -> String {
    let stem = Path::new(key)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    format!("{}/{}.png", OUTPUT_PREFIX, stem)
}

/// Returns the file name component of a key, preserving its original case.
pub fn filename(key: &str) -> &str {
    Path::new(key)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(key)
}

/// Content type reported for the uploaded image part, derived from the
/// lowercased extension (`image/jpg`, `image/jpeg`, `image/png`).
pub fn image_content_type(ext: &str) -> String {
    format!("image/{}", ext)
}
