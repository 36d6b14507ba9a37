//! End-to-end handler tests
//!
//! These tests drive the event processor with realistic S3 notification
//! payloads, an in-memory storage backend, and a mocked PhotoRoom endpoint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{Context, LambdaEvent};
use serde_json::json;

use clearcut_lambda::handler::{function_handler, EventProcessor};
use clearcut_services::PhotoRoomClient;
use clearcut_storage::{Storage, StorageError, StorageResult};

/// In-memory storage that records what the pipeline writes.
#[derive(Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    metadata: HashMap<String, String>,
}

struct MemoryStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_puts: bool,
}

impl MemoryStorage {
    fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_puts: false,
        }
    }

    fn with_failing_puts() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_puts: true,
        }
    }

    fn set_object(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(
            format!("{}/{}", bucket, key),
            StoredObject {
                data,
                content_type: String::new(),
                metadata: HashMap::new(),
            },
        );
    }

    fn get_object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{}/{}", bucket, key))
            .cloned()
    }

    fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{}/{}", bucket, key))
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", bucket, key)))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        if self.fail_puts {
            return Err(StorageError::UploadFailed("injected failure".to_string()));
        }

        self.objects.lock().unwrap().insert(
            format!("{}/{}", bucket, key),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                metadata,
            },
        );
        Ok(())
    }
}

/// One S3 notification record in the shape S3 actually delivers.
fn record_json(bucket: &str, key: &str) -> serde_json::Value {
    json!({
        "eventVersion": "2.1",
        "eventSource": "aws:s3",
        "awsRegion": "us-east-1",
        "eventTime": "2024-05-14T09:21:33.000Z",
        "eventName": "ObjectCreated:Put",
        "userIdentity": { "principalId": "AWS:EXAMPLE" },
        "requestParameters": { "sourceIPAddress": "127.0.0.1" },
        "responseElements": {
            "x-amz-request-id": "C3D13FE58DE4C810",
            "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S"
        },
        "s3": {
            "s3SchemaVersion": "1.0",
            "configurationId": "remove-bg-trigger",
            "bucket": {
                "name": bucket,
                "ownerIdentity": { "principalId": "EXAMPLE" },
                "arn": format!("arn:aws:s3:::{}", bucket)
            },
            "object": {
                "key": key,
                "size": 1024,
                "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                "sequencer": "0055AED6DCD90281E5"
            }
        }
    })
}

fn s3_event(objects: &[(&str, &str)]) -> S3Event {
    let records: Vec<serde_json::Value> = objects
        .iter()
        .map(|(bucket, key)| record_json(bucket, key))
        .collect();
    serde_json::from_value(json!({ "Records": records })).unwrap()
}

fn processor_for(server: &mockito::Server, storage: Arc<MemoryStorage>) -> EventProcessor {
    let photoroom =
        PhotoRoomClient::with_base_url("test-api-key".to_string(), server.url()).unwrap();
    EventProcessor::new(storage, photoroom)
}

#[tokio::test]
async fn test_processes_supported_object_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/segment")
        .match_header("x-api-key", "test-api-key")
        .with_status(200)
        .with_body(b"processed-bytes")
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_object("uploads", "remove-bg/photo.JPG", b"raw-image".to_vec());
    let processor = processor_for(&server, storage.clone());

    let event = s3_event(&[("uploads", "remove-bg/photo.JPG")]);
    let response = function_handler(LambdaEvent::new(event, Context::default()), &processor)
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert!(response
        .body
        .contains("Background removal completed successfully"));

    let stored = storage
        .get_object("uploads", "clean/photo.png")
        .expect("processed object was not written");
    assert_eq!(stored.data, b"processed-bytes".to_vec());
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(
        stored.metadata.get("original-file"),
        Some(&"remove-bg/photo.JPG".to_string())
    );
    assert_eq!(
        stored.metadata.get("processed-by"),
        Some(&"clearcut-lambda".to_string())
    );
    let processing_date = stored
        .metadata
        .get("processing-date")
        .expect("processing-date metadata missing");
    assert!(chrono::DateTime::parse_from_rfc3339(processing_date).is_ok());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_ignores_objects_outside_input_prefix() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/segment")
        .expect(0)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let processor = processor_for(&server, storage.clone());

    let event = s3_event(&[("uploads", "other/photo.png")]);
    let ack = processor.process_event(event).await.unwrap();

    assert_eq!(ack.status_code, 200);
    assert_eq!(storage.object_count(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_skips_unsupported_extensions() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/segment")
        .expect(0)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_object("uploads", "remove-bg/doc.pdf", b"%PDF-1.7".to_vec());
    let processor = processor_for(&server, storage.clone());

    let event = s3_event(&[("uploads", "remove-bg/doc.pdf")]);
    let ack = processor.process_event(event).await.unwrap();

    assert_eq!(ack.status_code, 200);
    assert!(storage.get_object("uploads", "clean/doc.png").is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_decodes_url_encoded_keys() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/segment")
        .with_status(200)
        .with_body(b"processed-bytes")
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_object("uploads", "remove-bg/a b.png", b"raw-image".to_vec());
    let processor = processor_for(&server, storage.clone());

    // The notification carries the encoded form of the key.
    let event = s3_event(&[("uploads", "remove-bg/a+b.png")]);
    processor.process_event(event).await.unwrap();

    assert!(storage.get_object("uploads", "clean/a b.png").is_some());
}

#[tokio::test]
async fn test_remote_failure_aborts_without_output_write() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/segment")
        .with_status(500)
        .with_body("upstream model crashed")
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_object("uploads", "remove-bg/photo.png", b"raw-image".to_vec());
    let processor = processor_for(&server, storage.clone());

    let event = s3_event(&[("uploads", "remove-bg/photo.png")]);
    let err = processor.process_event(event).await.unwrap_err();

    assert!(err.to_string().contains("500"));
    assert!(storage.get_object("uploads", "clean/photo.png").is_none());
}

#[tokio::test]
async fn test_storage_write_failure_surfaces_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/segment")
        .with_status(200)
        .with_body(b"processed-bytes")
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::with_failing_puts());
    storage.set_object("uploads", "remove-bg/photo.png", b"raw-image".to_vec());
    let processor = processor_for(&server, storage.clone());

    let event = s3_event(&[("uploads", "remove-bg/photo.png")]);
    let err = processor.process_event(event).await.unwrap_err();

    assert!(err.to_string().contains("Upload failed"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_aborts_batch_on_first_record_failure() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/segment")
        .expect(0)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_object("uploads", "remove-bg/second.png", b"raw-image".to_vec());
    let processor = processor_for(&server, storage.clone());

    // The first record's object does not exist, so its fetch fails and the
    // second record never runs.
    let event = s3_event(&[
        ("uploads", "remove-bg/missing.png"),
        ("uploads", "remove-bg/second.png"),
    ]);
    let err = processor.process_event(event).await.unwrap_err();

    assert!(err.to_string().contains("missing.png"));
    assert!(storage.get_object("uploads", "clean/second.png").is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_skips_do_not_abort_the_batch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/segment")
        .with_status(200)
        .with_body(b"processed-bytes")
        .expect(1)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_object("uploads", "remove-bg/photo.png", b"raw-image".to_vec());
    let processor = processor_for(&server, storage.clone());

    let event = s3_event(&[
        ("uploads", "other/skip.png"),
        ("uploads", "remove-bg/photo.png"),
    ]);
    let ack = processor.process_event(event).await.unwrap();

    assert_eq!(ack.status_code, 200);
    assert!(storage.get_object("uploads", "clean/photo.png").is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_record_without_object_key_is_an_error() {
    let server = mockito::Server::new_async().await;

    let storage = Arc::new(MemoryStorage::new());
    let processor = processor_for(&server, storage.clone());

    let mut record = record_json("uploads", "remove-bg/photo.png");
    record["s3"]["object"]
        .as_object_mut()
        .unwrap()
        .remove("key");
    let event: S3Event = serde_json::from_value(json!({ "Records": [record] })).unwrap();

    let err = processor.process_event(event).await.unwrap_err();
    assert!(err.to_string().contains("object key"));
    assert_eq!(storage.object_count(), 0);
}
