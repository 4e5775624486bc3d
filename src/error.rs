use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Body served for every failed pipeline run.
pub const TEAPOT_BODY: &str = "418 - I'm a teapot";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Invalid lookup base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Error fetching IPInfo data: {0}")]
    Status(u16),
    #[error("IPInfo request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Invalid IPInfo response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Background image {path} is missing: {source}")]
    BackgroundMissing {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Background image {path} is unreadable: {reason}")]
    BackgroundUnreadable { path: String, reason: String },
    #[error("Overlay rendering failed: {0}")]
    RenderFailed(String),
    #[error("Failed to write overlay image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("Template video {0} is missing")]
    TemplateMissing(String),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error("Failed to start {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ffmpeg exited with code {exit_code:?}: {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("ffmpeg did not finish within {0:?}")]
    TimedOut(std::time::Duration),
    #[error("No encoder slot became free within {0:?}")]
    Busy(std::time::Duration),
    #[error("Overlay task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Composite(#[from] CompositeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Pipeline failed: {}", self);

        (
            StatusCode::IM_A_TEAPOT,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            TEAPOT_BODY,
        )
            .into_response()
    }
}
