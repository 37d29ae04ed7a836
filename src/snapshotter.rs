// Device status fetch: one GET against the gateway's status API per attempt.

use crate::clock::Clock;
use crate::config::DeviceConfig;
use crate::error::FetchError;
use crate::models::Capture;
use crate::retry::RetryPolicy;
use bytes::Bytes;
use reqwest::{Client, Url};
use std::time::Duration;

pub struct Snapshotter {
    client: Client,
    url: Url,
    validate_json: bool,
    retry: RetryPolicy,
}

impl Snapshotter {
    pub fn new(config: &DeviceConfig, retry: RetryPolicy) -> anyhow::Result<Self> {
        let url = Url::parse(&config.url)?;
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url,
            validate_json: config.validate_json,
            retry,
        })
    }

    /// Take a timestamp from `clock`, then fetch the status payload.
    /// Retries (if any) reuse the timestamp taken before the first attempt.
    pub async fn capture(&self, clock: &dyn Clock) -> Result<Capture, FetchError> {
        let timestamp = clock.now_secs();
        tracing::info!(timestamp, "Capture time");
        tracing::info!(url = %self.url, "Fetching monitor status");

        let payload = self
            .retry
            .retry("fetch_status", move || self.fetch_once())
            .await?;
        tracing::info!(
            timestamp,
            bytes = payload.len(),
            "{}",
            String::from_utf8_lossy(&payload)
        );
        Ok(Capture { timestamp, payload })
    }

    async fn fetch_once(&self) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(FetchError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().await.map_err(FetchError::Body)?;
        if self.validate_json {
            serde_json::from_slice::<serde::de::IgnoredAny>(&body)
                .map_err(FetchError::InvalidJson)?;
        }
        Ok(body)
    }
}
