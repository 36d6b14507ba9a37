//! PhotoRoom segmentation client
//!
//! This client calls PhotoRoom's segment endpoint to strip the background
//! from an image. API: https://www.photoroom.com/api
//!
//! The request is `multipart/form-data` with three parts in order:
//! `output_format`, `bg_color`, and the `image_file` binary. PhotoRoom
//! replies with the processed image bytes on success.

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use clearcut_core::constants::{BACKGROUND_COLOR, OUTPUT_FORMAT, PHOTOROOM_API_BASE};

/// Segmentation request errors
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Segmentation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Segmentation API returned {status} {status_text}: {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },
}

/// PhotoRoom API client
///
/// The API key is injected at construction and sent as the `X-Api-Key`
/// header on every request.
#[derive(Clone)]
pub struct PhotoRoomClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PhotoRoomClient {
    pub fn new(api_key: String) -> Result<Self, SegmentError> {
        Self::with_base_url(api_key, PHOTOROOM_API_BASE)
    }

    /// Create a client against an alternate endpoint. Used by tests to point
    /// the client at a mock server.
    pub fn with_base_url(api_key: String, base_url: impl AsRef<str>) -> Result<Self, SegmentError> {
        let client = reqwest::Client::builder().build()?;

        Ok(PhotoRoomClient {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Remove the background from an image, returning the processed bytes.
    ///
    /// `filename` is forwarded as the upload filename with its original case;
    /// `extension` must already be lowercased and drives the part's content
    /// type (`image/jpg`, `image/jpeg`, `image/png`).
    pub async fn segment(
        &self,
        image: Vec<u8>,
        filename: &str,
        extension: &str,
    ) -> Result<Vec<u8>, SegmentError> {
        let url = format!("{}/v1/segment", self.base_url);
        let size = image.len() as u64;
        let start = std::time::Instant::now();

        let image_part = Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str(&clearcut_core::keys::image_content_type(extension))?;

        // Part order matters to some multipart consumers; keep the fields
        // ahead of the binary.
        let form = Form::new()
            .text("output_format", OUTPUT_FORMAT)
            .text("bg_color", BACKGROUND_COLOR)
            .part("image_file", image_part);

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!(
                status = status.as_u16(),
                filename = %filename,
                body = %body,
                "PhotoRoom segmentation failed"
            );

            return Err(SegmentError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let processed = response.bytes().await?.to_vec();

        tracing::info!(
            filename = %filename,
            input_bytes = size,
            output_bytes = processed.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "PhotoRoom segmentation successful"
        );

        Ok(processed)
    }
}
