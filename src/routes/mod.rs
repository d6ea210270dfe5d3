pub mod health;
pub mod relay;
pub mod static_files;

use crate::config::Config;
use crate::relay::RelayService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Shared, read-only request context.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: RelayService,
}

impl AppState {
    pub fn new(config: Config, relay: RelayService) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}

/// Builds the relay's HTTP surface.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(&state.config.static_dir);
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(static_files::index))
        .route("/health", get(health::health_check))
        .route(
            "/compress-and-forward/",
            post(relay::compress_and_forward).layer(upload_limit),
        )
        .nest_service("/static", assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
