use std::sync::Arc;

use axum::{routing::put, Router};

use crate::features::admin::handlers;
use crate::features::reports::services::ReportService;

/// Create admin routes (all require admin access), nested under `/api/v1/admin`
pub fn routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/reports/{id}/status",
            put(handlers::update_report_status),
        )
        .with_state(report_service)
}
