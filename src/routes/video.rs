use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::Html,
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::pipeline::{
    self,
    resolve::{resolve_client_address, AddressSources},
};
use crate::routes::STATIC_ROUTE;
use crate::state::AppState;

/// Seconds before the browser reloads a page whose address just changed.
const REFRESH_SECONDS: u32 = 5;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(video_page))
}

async fn video_page(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());
    let sources = AddressSources::from_headers(&headers, peer);
    tracing::debug!(
        "remote_addr: {:?}, X-Forwarded-For: {:?}, X-Real-IP: {:?}",
        sources.peer,
        sources.forwarded_for,
        sources.real_ip
    );

    let address = resolve_client_address(&sources, &state.config().fallback_address);
    let changed = state.record_address(&address);
    tracing::info!("Client IP: {} (changed: {})", address, changed);

    let output = pipeline::generate(&state, &address).await?;
    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let video_src = format!("{}/{}", STATIC_ROUTE, file_name);

    Ok(Html(render_page(&address, &video_src, changed)))
}

pub fn render_page(address: &str, video_src: &str, refresh: bool) -> String {
    let refresh_meta = if refresh {
        format!("\n    <meta http-equiv=\"refresh\" content=\"{REFRESH_SECONDS}\">")
    } else {
        String::new()
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Video</title>{refresh_meta}
</head>
<body>
    <h1>Generated Video for IP: {address}</h1>
    <video width="640" height="360" controls>
        <source src="{video_src}" type="video/mp4">
        Your browser does not support the video tag.
    </video>
</body>
</html>
"#,
        address = htmlescape::encode_minimal(address),
        video_src = htmlescape::encode_minimal(video_src),
    )
}
