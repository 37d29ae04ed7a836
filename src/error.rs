// Error types for the two network stages of a run.

use thiserror::Error;

/// Device status fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, ...
    #[error("device request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("device returned HTTP {0}")]
    Status(u16),

    /// Body could not be read to completion.
    #[error("failed to read device response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("device payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

/// Object store write failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("put_object {bucket}/{key} failed: {message}")]
    Put {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Terminal failure of a run, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("upload failed: {0}")]
    Upload(#[from] StoreError),
}
