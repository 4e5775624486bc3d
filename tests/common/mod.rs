#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use axum::{
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use geoviz_rs::{config::Config, state::AppState};
use serde_json::json;
use tempfile::TempDir;

pub const TOKEN: &str = "test-token";

/// Shell stand-in for ffmpeg: copies the overlay input (5th argument) to the
/// output path, or fails when the template path mentions `fail_template`.
#[cfg(unix)]
const FAKE_FFMPEG: &str = r#"#!/bin/sh
case "$3" in
  *fail_template*) echo "simulated encoder failure" >&2; exit 1 ;;
esac
for last; do :; done
cp "$5" "$last"
"#;

/// Written once per test binary, before any test spawns it.
#[cfg(unix)]
pub fn fake_ffmpeg() -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    static DIR: OnceLock<TempDir> = OnceLock::new();
    let dir = DIR.get_or_init(|| {
        let dir = tempfile::tempdir().expect("script dir");
        let script = dir.path().join("ffmpeg");
        std::fs::write(&script, FAKE_FFMPEG).expect("write script");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
        dir
    });
    dir.path().join("ffmpeg")
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    hits: Arc<Mutex<Vec<String>>>,
}

/// Local replacement for the ipinfo endpoint.
pub struct MockIpinfo {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl MockIpinfo {
    pub async fn spawn(status: StatusCode) -> Self {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/:ip/json", get(mock_lookup))
            .with_state(MockState {
                status,
                hits: hits.clone(),
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    /// Addresses requested so far, in order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().expect("hits lock").clone()
    }
}

async fn mock_lookup(
    State(state): State<MockState>,
    UrlPath(ip): UrlPath<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.hits.lock().expect("hits lock").push(ip.clone());

    if query.get("token").map(String::as_str) != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }
    if state.status != StatusCode::OK {
        return (state.status, "denied").into_response();
    }
    if ip == "0.0.0.1" {
        return Json(json!({ "ip": ip, "bogon": true })).into_response();
    }

    Json(json!({
        "ip": ip,
        "city": "Mountain View",
        "region": "California",
        "country": "US",
        "org": "AS15169 Google LLC"
    }))
    .into_response()
}

/// Temporary working directory holding assets, outputs and overlay files.
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

impl Workspace {
    pub fn new(base_url: &str) -> Self {
        let dir = tempfile::tempdir().expect("workspace");
        let background = dir.path().join("image.png");
        let mut pixmap = tiny_skia::Pixmap::new(64, 48).expect("pixmap");
        pixmap.fill(tiny_skia::Color::from_rgba8(20, 40, 80, 255));
        pixmap.save_png(&background).expect("background png");

        let template = dir.path().join("video.mp4");
        std::fs::write(&template, b"template").expect("template");

        let overlay_dir = dir.path().join("tmp");
        std::fs::create_dir_all(&overlay_dir).expect("overlay dir");

        let config = Config {
            ipinfo_token: TOKEN.to_string(),
            ipinfo_base_url: base_url.to_string(),
            background_image: background,
            template_video: template,
            static_dir: dir.path().join("static"),
            overlay_temp_dir: overlay_dir,
            ffmpeg_bin: ffmpeg_bin(),
            lookup_timeout: Duration::from_secs(5),
            encode_timeout: Duration::from_secs(10),
            encode_queue_timeout: Duration::from_secs(5),
            ..Config::default()
        };

        Self { dir, config }
    }

    pub fn state(&self) -> AppState {
        AppState::with_http_client(self.config.clone(), test_client())
    }

    pub fn static_files(&self) -> Vec<PathBuf> {
        list_dir(&self.config.static_dir)
    }

    pub fn overlay_files(&self) -> Vec<PathBuf> {
        list_dir(&self.config.overlay_temp_dir)
    }
}

#[cfg(unix)]
fn ffmpeg_bin() -> String {
    fake_ffmpeg().display().to_string()
}

#[cfg(not(unix))]
fn ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client")
}

fn list_dir(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.expect("entry").path()).collect(),
        Err(_) => Vec::new(),
    }
}
