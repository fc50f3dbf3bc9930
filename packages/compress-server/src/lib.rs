pub mod config;
pub mod handler;
pub mod transform;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// エンコードの同時実行数を制限するセマフォ
    pub encode_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let slots = config.max_concurrent_encodes.max(1);
        Self {
            config: Arc::new(config),
            encode_slots: Arc::new(Semaphore::new(slots)),
        }
    }
}

/// ルーターを組み立てる
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handler::index))
        .route("/health", get(handler::health))
        .route("/compress", post(handler::compress))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
