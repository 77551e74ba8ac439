use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::core::middleware::session_middleware;
use crate::features::auth::AuthService;
use crate::features::web::handlers::{self, WebState};

/// Server-rendered pages. Every page, the fallback included, sees the session
/// user resolved from the cookie.
pub fn routes(state: WebState) -> Router {
    let auth: Arc<AuthService> = state.auth.clone();

    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/reports", get(handlers::reports_page))
        .route("/report/new", get(handlers::new_report_page).post(handlers::new_report_submit))
        .route("/report/{id}", get(handlers::report_detail))
        .route("/report/{id}/comment", post(handlers::add_comment))
        .route("/register", get(handlers::register_page).post(handlers::register_submit))
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        .route("/logout", get(handlers::logout))
        .route("/admin/reports", get(handlers::admin_reports))
        .route("/admin/report/{id}/update_status", post(handlers::update_status))
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(auth, session_middleware))
        .with_state(state)
}
