// HTTP routes: heatmap CSV, summed series JSON, status

mod error;
mod http;

pub use error::ApiError;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::cache::MetricsCache;
use crate::poller::PollStats;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) cache: Arc<MetricsCache>,
    pub(crate) stats: Arc<PollStats>,
}

pub fn app(cache: Arc<MetricsCache>, stats: Arc<PollStats>, static_dir: Option<&str>) -> Router {
    let state = AppState { cache, stats };
    let mut router = Router::new()
        .route("/heatmap_data", get(http::heatmap_handler)) // GET /heatmap_data?entity=&metric=
        .route("/ts_sum", get(http::ts_sum_handler)) // GET /ts_sum?entity=&metric=
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/status", get(http::status_handler)); // GET /api/status
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }
    router
        .layer(CompressionLayer::new())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
