pub mod health;
pub mod video;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// URL prefix the output directory is served under.
pub const STATIC_ROUTE: &str = "/static";

/// Full application router: pipeline page, health check, and the output
/// directory as static files.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .merge(health::router())
        .merge(video::router())
        .nest_service(STATIC_ROUTE, static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
