// Process-level behaviour: exit codes of a single run

mod common;

use axum::Router;
use axum::extract::State;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use common::*;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};

fn write_config(dir: &tempfile::TempDir, device_url: &str, endpoint_url: &str) -> String {
    let path = dir.path().join("config.toml");
    let config = format!(
        r#"
[device]
url = "{device_url}"
timeout_secs = 5

[store]
endpoint_url = "{endpoint_url}"
region = "auto"
bucket = "solarmon"
access_key_id = "test"
secret_access_key = "test"
"#
    );
    std::fs::write(&path, config).unwrap();
    path.to_str().unwrap().to_string()
}

fn run_binary(config_path: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solarmon"))
        .env("CONFIG_FILE", config_path)
        .env_remove("SOLARMON_ACCESS_KEY_ID")
        .env_remove("SOLARMON_SECRET_ACCESS_KEY")
        .env("RUST_LOG", "info")
        .output()
        .expect("spawn solarmon")
}

#[test]
fn test_missing_config_exits_non_zero() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let output = run_binary(missing.to_str().unwrap());
    assert!(!output.status.success());
}

#[test]
fn test_invalid_config_exits_non_zero() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_config(&dir, "not-a-url", "http://127.0.0.1:9");
    let output = run_binary(&path);
    assert!(!output.status.success());
}

#[test]
fn test_unreachable_device_exits_non_zero() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_config(&dir, &refused_url(), "http://127.0.0.1:9");
    let output = run_binary(&path);
    assert!(!output.status.success());
}

/// A request as seen by the fake S3 endpoint.
struct ReceivedPut {
    method: Method,
    path: String,
    content_type: Option<String>,
    body: Bytes,
}

type Requests = Arc<Mutex<Vec<ReceivedPut>>>;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_successful_run_puts_object_and_exits_zero() {
    let device_url = device(StatusCode::OK, "{\"ok\":true}").await;

    let requests: Requests = Arc::default();
    let fake_s3 = Router::new()
        .fallback(
            |State(requests): State<Requests>,
             method: Method,
             uri: Uri,
             headers: HeaderMap,
             body: Bytes| async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                requests.lock().unwrap().push(ReceivedPut {
                    method,
                    path: uri.path().to_string(),
                    content_type,
                    body,
                });
                StatusCode::OK
            },
        )
        .with_state(requests.clone());
    let s3_addr = serve(fake_s3).await;

    let dir = tempfile::TempDir::new().unwrap();
    let path = write_config(&dir, &device_url, &format!("http://{}", s3_addr));
    let output = tokio::task::spawn_blocking(move || run_binary(&path))
        .await
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}\nstdout: {}",
        String::from_utf8_lossy(&output.stderr),
        String::from_utf8_lossy(&output.stdout)
    );
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let put = &requests[0];
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.content_type.as_deref(), Some("application/json"));
    assert_eq!(&put.body[..], b"{\"ok\":true}");
    let path = &put.path;
    let name = path
        .strip_prefix("/solarmon/monitor/")
        .and_then(|rest| rest.strip_suffix(".json"))
        .unwrap_or_else(|| panic!("unexpected object path {}", path));
    assert!(name.parse::<u64>().is_ok(), "timestamp in {}", path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_store_rejection_exits_non_zero() {
    let device_url = device(StatusCode::OK, "{\"ok\":true}").await;
    let fake_s3 = Router::new().fallback(|| async { StatusCode::FORBIDDEN });
    let s3_addr = serve(fake_s3).await;

    let dir = tempfile::TempDir::new().unwrap();
    let path = write_config(&dir, &device_url, &format!("http://{}", s3_addr));
    let output = tokio::task::spawn_blocking(move || run_binary(&path))
        .await
        .unwrap();
    assert!(!output.status.success());
}
