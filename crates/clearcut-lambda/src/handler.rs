//! S3 event handler
//!
//! Drives one invocation of the background-removal pipeline: filter the
//! notification records, fetch each source image, segment it through
//! PhotoRoom, and store the result under the output prefix.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use chrono::Utc;
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;

use clearcut_core::constants::{
    INPUT_PREFIX, METADATA_ORIGINAL_FILE, METADATA_PROCESSED_BY, METADATA_PROCESSING_DATE,
    OUTPUT_CONTENT_TYPE, PROCESSOR_TAG,
};
use clearcut_core::keys;
use clearcut_services::PhotoRoomClient;
use clearcut_storage::Storage;

/// Acknowledgement returned when an invocation processes its whole batch.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl AckResponse {
    pub fn completed() -> Self {
        AckResponse {
            status_code: 200,
            body: serde_json::json!({
                "message": "Background removal completed successfully"
            })
            .to_string(),
        }
    }
}

/// Processes S3 event notifications record by record.
pub struct EventProcessor {
    storage: Arc<dyn Storage>,
    photoroom: PhotoRoomClient,
}

impl EventProcessor {
    pub fn new(storage: Arc<dyn Storage>, photoroom: PhotoRoomClient) -> Self {
        EventProcessor { storage, photoroom }
    }

    /// Process every record in the notification, in order.
    ///
    /// Records that are not pipeline inputs are skipped. The first failure
    /// aborts the invocation, leaving the remaining records unprocessed.
    pub async fn process_event(&self, event: S3Event) -> anyhow::Result<AckResponse> {
        tracing::info!(records = event.records.len(), "Processing S3 event");

        for record in &event.records {
            self.process_record(record).await?;
        }

        Ok(AckResponse::completed())
    }

    async fn process_record(&self, record: &S3EventRecord) -> anyhow::Result<()> {
        let bucket = record
            .s3
            .bucket
            .name
            .as_deref()
            .context("Notification record is missing the bucket name")?;
        let raw_key = record
            .s3
            .object
            .key
            .as_deref()
            .context("Notification record is missing the object key")?;

        let key = keys::decode_object_key(raw_key)?;

        if !key.starts_with(INPUT_PREFIX) {
            tracing::info!(
                bucket = %bucket,
                key = %key,
                "Skipping object outside input prefix"
            );
            return Ok(());
        }

        let extension = match keys::extension(&key) {
            Some(ext) if keys::is_supported_extension(&ext) => ext,
            _ => {
                tracing::info!(
                    bucket = %bucket,
                    key = %key,
                    "Skipping object with unsupported extension"
                );
                return Ok(());
            }
        };

        tracing::info!(bucket = %bucket, key = %key, "Removing image background");

        let image = self.storage.get(bucket, &key).await?;

        let processed = self
            .photoroom
            .segment(image, keys::filename(&key), &extension)
            .await?;

        let output_key = keys::output_key(&key);
        let metadata = HashMap::from([
            (METADATA_ORIGINAL_FILE.to_string(), key.clone()),
            (METADATA_PROCESSED_BY.to_string(), PROCESSOR_TAG.to_string()),
            (METADATA_PROCESSING_DATE.to_string(), Utc::now().to_rfc3339()),
        ]);

        self.storage
            .put(bucket, &output_key, processed, OUTPUT_CONTENT_TYPE, metadata)
            .await?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            output_key = %output_key,
            "Background removal complete"
        );

        Ok(())
    }
}

/// Lambda entry point wrapper around the event processor.
pub async fn function_handler(
    event: LambdaEvent<S3Event>,
    processor: &EventProcessor,
) -> Result<AckResponse, Error> {
    Ok(processor.process_event(event.payload).await?)
}
