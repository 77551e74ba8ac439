use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Comment routes. All of them need the bearer auth middleware applied by the caller.
pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/v1/reports/{id}/comments",
            post(handlers::create_comment),
        )
        .with_state(service)
}
