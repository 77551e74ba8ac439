use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::stats::handlers;
use crate::features::stats::services::StatsService;

/// Public statistics routes, including the legacy aliases
pub fn routes(service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/api/v1/stats/summary", get(handlers::get_summary))
        .route("/api/stats/summary", get(handlers::get_summary))
        .route("/api/reports/stats", get(handlers::get_summary))
        .with_state(service)
}
