// Shared test helpers: a fake gateway served by axum on an ephemeral port.
#![allow(dead_code)]

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use solarmon::config::DeviceConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const STATUS_PATH: &str = "/cgi-bin/dl_cgi";

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn status_url(addr: SocketAddr) -> String {
    format!("http://{}{}?Command=DeviceList", addr, STATUS_PATH)
}

/// Device that always answers with `status` and `body`.
pub async fn device(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(STATUS_PATH, get(move || async move { (status, body) }));
    status_url(serve(app).await)
}

/// Device that fails the first `failures` requests with 503, then answers `body`.
/// Returns the URL and a hit counter.
pub async fn flaky_device(failures: usize, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            STATUS_PATH,
            get(move |State(hits): State<Arc<AtomicUsize>>| async move {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    (StatusCode::SERVICE_UNAVAILABLE, "busy")
                } else {
                    (StatusCode::OK, body)
                }
            }),
        )
        .with_state(hits.clone());
    (status_url(serve(app).await), hits)
}

/// URL on a port nothing listens on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    status_url(addr)
}

pub fn device_config(url: String) -> DeviceConfig {
    DeviceConfig {
        url,
        timeout_secs: Some(5),
        validate_json: false,
    }
}
