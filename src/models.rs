// Domain models for a single collect-and-archive run.

use bytes::Bytes;

/// One timestamped snapshot of the device status.
/// `timestamp` is taken before the request that produced `payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    /// Response body exactly as the device sent it.
    pub payload: Bytes,
}

/// What ended up in the store for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveObject {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
}

/// Object key for a capture: `<prefix>/<timestamp>.json`.
pub fn object_key(prefix: &str, timestamp: u64) -> String {
    format!("{}/{}.json", prefix, timestamp)
}
