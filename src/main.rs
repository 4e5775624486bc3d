use std::net::SocketAddr;

use geoviz_rs::{config, pipeline::retention, routes, state};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoviz_rs=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Error: {}", err);
            std::process::exit(1);
        }
    };

    if config.output_ttl.is_zero() {
        tracing::info!("Output retention disabled");
    } else {
        tokio::spawn(retention::run_sweeper(
            config.static_dir.clone(),
            config.output_ttl,
            config.retention_sweep_interval,
        ));
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = match state::AppState::new(config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Failed to build HTTP client: {}", err);
            std::process::exit(1);
        }
    };
    let app = routes::app(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };

    tracing::info!("GeoViz-RS listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Video page: GET http://{}/", addr);

    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!("Server error: {}", err);
        std::process::exit(1);
    }
}
