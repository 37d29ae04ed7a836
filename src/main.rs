use anyhow::Result;
use solarmon::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let app_config = match config::AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.context("configuration"));
        }
    };
    let retry_policy = retry::RetryPolicy::from(&app_config.retry);

    let snapshotter = snapshotter::Snapshotter::new(&app_config.device, retry_policy.clone())?;
    let store = Arc::new(store::S3Store::connect(&app_config.store).await);
    let archiver = archiver::Archiver::new(
        store,
        app_config.store.bucket.clone(),
        app_config.store.prefix.clone(),
        retry_policy,
    );

    let object = pipeline::run_once(&clock::SystemClock, &snapshotter, &archiver).await?;
    tracing::info!(bucket = %object.bucket, key = %object.key, "Run complete");
    Ok(())
}
