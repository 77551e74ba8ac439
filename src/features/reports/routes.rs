use axum::{
    routing::{get, post},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};

/// Public report routes, including the legacy `/api/reports` alias
pub fn public_routes(state: ReportState) -> Router {
    Router::new()
        .route("/api/v1/reports", get(handlers::list_reports))
        .route("/api/v1/reports/{id}", get(handlers::get_report))
        .route("/api/reports", get(handlers::list_reports))
        .with_state(state)
}

/// Report routes that need the bearer auth middleware applied by the caller
pub fn protected_routes(state: ReportState) -> Router {
    Router::new()
        .route("/api/v1/reports", post(handlers::create_report))
        .with_state(state)
}
