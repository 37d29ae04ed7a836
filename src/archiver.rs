// Writes a capture to the object store under its deterministic key.

use crate::error::StoreError;
use crate::models::{ArchiveObject, Capture, object_key};
use crate::retry::RetryPolicy;
use crate::store::ObjectStore;
use std::sync::Arc;

/// Content type of archived objects; the gateway speaks JSON.
pub const CONTENT_TYPE: &str = "application/json";

pub struct Archiver {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
    retry: RetryPolicy,
}

impl Archiver {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix: prefix.into(),
            retry,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload `capture.payload` unmodified to `<prefix>/<timestamp>.json`.
    /// An existing object under the same key is overwritten.
    pub async fn archive(&self, capture: &Capture) -> Result<ArchiveObject, StoreError> {
        let key = object_key(&self.prefix, capture.timestamp);
        let store = self.store.as_ref();
        let bucket = self.bucket.as_str();
        let key_ref = key.as_str();

        self.retry
            .retry("put_object", move || {
                store.put_object(bucket, key_ref, capture.payload.clone(), CONTENT_TYPE)
            })
            .await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            bytes = capture.payload.len(),
            "Uploaded"
        );
        Ok(ArchiveObject {
            bucket: self.bucket.clone(),
            key,
            body: capture.payload.clone(),
        })
    }
}
