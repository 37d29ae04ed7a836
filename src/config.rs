use anyhow::Context;
use serde::Deserialize;

/// Env var that overrides `store.access_key_id`.
pub const ACCESS_KEY_ENV: &str = "SOLARMON_ACCESS_KEY_ID";
/// Env var that overrides `store.secret_access_key`.
pub const SECRET_KEY_ENV: &str = "SOLARMON_SECRET_ACCESS_KEY";

const MAX_RETRY_ATTEMPTS: u32 = 10;
const MAX_BASE_DELAY_MS: u64 = 60_000;
const MAX_MULTIPLIER: f64 = 10.0;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Status API of the gateway, e.g. `http://172.27.153.1/cgi-bin/dl_cgi?Command=DeviceList`.
    pub url: String,
    /// Request timeout. Absent means the HTTP client default (no explicit timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Reject payloads that do not parse as JSON instead of archiving them.
    #[serde(default)]
    pub validate_json: bool,
}

#[derive(Clone, Deserialize)]
pub struct StoreConfig {
    pub endpoint_url: String,
    pub region: String,
    pub bucket: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Most S3-compatible providers (R2, MinIO) want path-style addressing.
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,
}

fn default_prefix() -> String {
    "monitor".into()
}

fn default_force_path_style() -> bool {
    true
}

// Keep the secret out of logs and panic messages.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per network call; 1 means no retry.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE` (default `config.toml`), applying credential env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path))?;
        Self::parse(&s, |name| std::env::var(name).ok())
    }

    /// Parse and validate config from a string (e.g. for tests). No env overrides.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        Self::parse(s, |_| None)
    }

    /// Parse, apply overrides from `lookup` (env var name -> value), then validate.
    pub fn parse(s: &str, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ACCESS_KEY_ENV).filter(|v| !v.is_empty()) {
            self.store.access_key_id = v;
        }
        if let Some(v) = lookup(SECRET_KEY_ENV).filter(|v| !v.is_empty()) {
            self.store.secret_access_key = v;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure_http_url("device.url", &self.device.url)?;
        if let Some(t) = self.device.timeout_secs {
            anyhow::ensure!(t > 0, "device.timeout_secs must be > 0, got {}", t);
        }
        ensure_http_url("store.endpoint_url", &self.store.endpoint_url)?;
        anyhow::ensure!(
            !self.store.region.is_empty(),
            "store.region must be non-empty"
        );
        anyhow::ensure!(
            !self.store.bucket.is_empty(),
            "store.bucket must be non-empty"
        );
        anyhow::ensure!(
            !self.store.prefix.is_empty(),
            "store.prefix must be non-empty"
        );
        anyhow::ensure!(
            !self.store.prefix.starts_with('/') && !self.store.prefix.ends_with('/'),
            "store.prefix must not start or end with '/', got {:?}",
            self.store.prefix
        );
        anyhow::ensure!(
            !self.store.access_key_id.is_empty(),
            "store.access_key_id must be set (or {})",
            ACCESS_KEY_ENV
        );
        anyhow::ensure!(
            !self.store.secret_access_key.is_empty(),
            "store.secret_access_key must be set (or {})",
            SECRET_KEY_ENV
        );
        anyhow::ensure!(
            (1..=MAX_RETRY_ATTEMPTS).contains(&self.retry.max_attempts),
            "retry.max_attempts must be between 1 and {}, got {}",
            MAX_RETRY_ATTEMPTS,
            self.retry.max_attempts
        );
        anyhow::ensure!(
            (1..=MAX_BASE_DELAY_MS).contains(&self.retry.base_delay_ms),
            "retry.base_delay_ms must be between 1 and {}, got {}",
            MAX_BASE_DELAY_MS,
            self.retry.base_delay_ms
        );
        anyhow::ensure!(
            (1.0..=MAX_MULTIPLIER).contains(&self.retry.multiplier),
            "retry.multiplier must be between 1.0 and {}, got {}",
            MAX_MULTIPLIER,
            self.retry.multiplier
        );
        Ok(())
    }
}

fn ensure_http_url(field: &str, value: &str) -> anyhow::Result<()> {
    let url = reqwest::Url::parse(value)
        .with_context(|| format!("{} is not a valid URL: {:?}", field, value))?;
    anyhow::ensure!(
        matches!(url.scheme(), "http" | "https"),
        "{} must use http or https, got {:?}",
        field,
        url.scheme()
    );
    Ok(())
}
