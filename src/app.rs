//! Service wiring and the HTTP router.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use sqlx::PgPool;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::admin::routes as admin_routes;
use crate::features::auth::{routes as auth_routes, AuthService};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::comments::{routes as comments_routes, CommentService};
use crate::features::reports::handlers::ReportState;
use crate::features::reports::{routes as reports_routes, ReportService};
use crate::features::stats::{routes as stats_routes, StatsService};
use crate::features::users::UserService;
use crate::features::web::{routes as web_routes, Templates, WebState};

/// Shared services, one instance per process
#[derive(Clone)]
pub struct AppContext {
    pub auth_service: Arc<AuthService>,
    pub category_service: Arc<CategoryService>,
    pub report_service: Arc<ReportService>,
    pub comment_service: Arc<CommentService>,
    pub stats_service: Arc<StatsService>,
    pub templates: Arc<Templates>,
}

impl AppContext {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let user_service = Arc::new(UserService::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(user_service, pool.clone(), &config.auth));
        tracing::info!("Auth service initialized");

        let category_service = Arc::new(CategoryService::new(pool.clone()));
        let report_service = Arc::new(ReportService::new(pool.clone()));
        let comment_service = Arc::new(CommentService::new(pool.clone()));
        let stats_service = Arc::new(StatsService::new(pool));
        tracing::info!("Report services initialized");

        let templates = Arc::new(Templates::new()?);
        tracing::info!("Page templates compiled");

        Ok(Self {
            auth_service,
            category_service,
            report_service,
            comment_service,
            stats_service,
            templates,
        })
    }
}

async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

/// Full application router: JSON API, web pages, Swagger UI and health check
pub fn router(ctx: &AppContext, config: &Config) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let report_state = ReportState {
        report_service: Arc::clone(&ctx.report_service),
        comment_service: Arc::clone(&ctx.comment_service),
    };

    // Protected routes (require a bearer token)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&ctx.auth_service)))
        .merge(reports_routes::protected_routes(report_state.clone()))
        .merge(comments_routes::routes(Arc::clone(&ctx.comment_service)))
        .nest(
            "/api/v1/admin",
            admin_routes::routes(Arc::clone(&ctx.report_service)),
        )
        .route_layer(from_fn_with_state(
            Arc::clone(&ctx.auth_service),
            middleware::auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(Arc::clone(&ctx.auth_service)))
        .merge(categories_routes::routes(Arc::clone(&ctx.category_service)))
        .merge(reports_routes::public_routes(report_state))
        .merge(stats_routes::routes(Arc::clone(&ctx.stats_service)))
        .route("/health", axum::routing::get(health_check));

    let web = web_routes::routes(WebState {
        templates: Arc::clone(&ctx.templates),
        auth: Arc::clone(&ctx.auth_service),
        reports: Arc::clone(&ctx.report_service),
        comments: Arc::clone(&ctx.comment_service),
        categories: Arc::clone(&ctx.category_service),
        stats: Arc::clone(&ctx.stats_service),
        cookie_secure: config.auth.session_cookie_secure,
    });

    Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(web)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderValue, StatusCode};
    use serde_json::{json, Value};
    use sqlx::PgPool;

    use crate::features::auth::services::TokenService;
    use crate::shared::test_helpers::{
        create_report, create_report_in, login_token, seed_user, test_config, test_server,
        TEST_PASSWORD,
    };

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_register_then_duplicates_are_rejected(pool: PgPool) {
        let server = test_server(pool.clone());
        let body = json!({
            "username": "river_watch",
            "email": "river@example.com",
            "password": "s3cret",
            "full_name": "River Watcher",
        });

        let response = server.post("/api/v1/auth/register").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        assert!(response.json::<Value>()["user_id"].as_i64().is_some());

        let duplicate = json!({
            "username": "river_watch",
            "email": "other@example.com",
            "password": "s3cret",
            "full_name": "Someone Else",
        });
        let response = server.post("/api/v1/auth/register").json(&duplicate).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Username already exists");

        let duplicate = json!({
            "username": "lake_watch",
            "email": "river@example.com",
            "password": "s3cret",
            "full_name": "Someone Else",
        });
        let response = server.post("/api/v1/auth/register").json(&duplicate).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Email already exists");

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_bearer_token_checks(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);
        let token = login_token(&server, &user.username).await;

        let response = server.get("/api/v1/auth/me").authorization_bearer(&token).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["username"], user.username.as_str());

        let response = server.get("/api/v1/auth/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["message"], "Token missing");

        let response = server
            .get("/api/v1/auth/me")
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Token {}", token)).unwrap(),
            )
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["message"], "Token format invalid");

        let response = server
            .get("/api/v1/auth/me")
            .authorization_bearer("not.a.jwt")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["message"], "Token invalid");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_wrong_password_is_rejected(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": user.username, "password": "wrong" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["message"], "Invalid credentials");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_admin_login_reports_admin_flag(pool: PgPool) {
        let admin = seed_user(&pool, true).await;
        let server = test_server(pool);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": admin.username, "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["user"]["id"], admin.id);
        assert_eq!(body["user"]["is_admin"], true);

        let claims = TokenService::new(&test_config().auth)
            .verify(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.user_id, admin.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_and_fetch_report(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);
        let token = login_token(&server, &user.username).await;

        let id = create_report(&server, &token, "Oil slick on the river").await;

        let response = server.get(&format!("/api/v1/reports/{}", id)).await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["title"], "Oil slick on the river");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["priority"], "high");
        assert_eq!(body["category"]["name"], "Water Pollution");
        assert_eq!(body["reporter"]["id"], user.id);
        assert_eq!(body["comments"], json!([]));

        server
            .get("/api/v1/reports/999999")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/api/v1/reports/abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid path parameter"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_report_creation_needs_a_token_and_a_known_category(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);

        let body = json!({
            "title": "Smoke",
            "description": "Thick smoke",
            "location": "Mill road",
            "category_id": 999,
            "priority": "low",
        });

        server
            .post("/api/v1/reports")
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let token = login_token(&server, &user.username).await;
        server
            .post("/api/v1/reports")
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_status_filter_and_stats(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let admin = seed_user(&pool, true).await;
        let server = test_server(pool);
        let token = login_token(&server, &user.username).await;
        let admin_token = login_token(&server, &admin.username).await;

        create_report(&server, &token, "First").await;
        create_report(&server, &token, "Second").await;
        let resolved = create_report(&server, &token, "Third").await;

        server
            .put(&format!("/api/v1/admin/reports/{}/status", resolved))
            .authorization_bearer(&admin_token)
            .json(&json!({ "status": "resolved" }))
            .await
            .assert_status_ok();

        let response = server.get("/api/v1/reports?status=pending").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["pagination"]["total"], 2);
        assert!(body["reports"]
            .as_array()
            .unwrap()
            .iter()
            .all(|r| r["status"] == "pending"));

        server
            .get("/api/v1/reports?status=closed")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server.get("/api/v1/stats/summary").await;
        response.assert_status_ok();
        let stats = response.json::<Value>();
        assert_eq!(stats["total_reports"], 3);
        assert_eq!(
            stats["by_status"],
            json!({ "pending": 2, "investigating": 0, "resolved": 1 })
        );
        assert_eq!(stats["by_priority"]["high"], 3);

        // Legacy aliases serve the same data
        let legacy = server.get("/api/reports/stats").await.json::<Value>();
        assert_eq!(legacy["total_reports"], 3);
    }

    fn report_ids(body: &Value) -> Vec<i64> {
        body["reports"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_category_filter_and_category_counts(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let admin = seed_user(&pool, true).await;
        let server = test_server(pool);
        let token = login_token(&server, &user.username).await;
        let admin_token = login_token(&server, &admin.username).await;

        create_report_in(&server, &token, "River foam", 1).await;
        create_report_in(&server, &token, "Well smells", 1).await;
        let smoke = create_report_in(&server, &token, "Factory smoke", 2).await;
        let dust = create_report_in(&server, &token, "Quarry dust", 2).await;

        server
            .put(&format!("/api/v1/admin/reports/{}/status", dust))
            .authorization_bearer(&admin_token)
            .json(&json!({ "status": "resolved" }))
            .await
            .assert_status_ok();

        let body = server.get("/api/v1/reports?category_id=2").await.json::<Value>();
        assert_eq!(body["pagination"]["total"], 2);
        let mut ids = report_ids(&body);
        ids.sort();
        assert_eq!(ids, vec![smoke, dust]);
        assert!(body["reports"]
            .as_array()
            .unwrap()
            .iter()
            .all(|r| r["category"]["id"] == 2));

        let body = server
            .get("/api/v1/reports?status=pending&category_id=2")
            .await
            .json::<Value>();
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(report_ids(&body), vec![smoke]);

        let body = server
            .get("/api/v1/reports?status=resolved&category_id=1")
            .await
            .json::<Value>();
        assert_eq!(body["pagination"]["total"], 0);
        assert_eq!(body["reports"], json!([]));

        let stats = server.get("/api/v1/stats/summary").await.json::<Value>();
        let by_category = stats["by_category"].as_array().unwrap();
        assert_eq!(by_category.len(), 5);
        let counts: Vec<(i64, i64)> = by_category
            .iter()
            .map(|c| (c["id"].as_i64().unwrap(), c["count"].as_i64().unwrap()))
            .collect();
        assert_eq!(counts, vec![(1, 2), (2, 2), (3, 0), (4, 0), (5, 0)]);
        assert_eq!(
            counts.iter().map(|(_, count)| count).sum::<i64>(),
            stats["total_reports"].as_i64().unwrap()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_page_far_beyond_the_end_is_empty(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);
        let token = login_token(&server, &user.username).await;
        create_report(&server, &token, "Only report").await;

        let response = server
            .get("/api/v1/reports?page=9223372036854775807&per_page=10")
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["reports"], json!([]));
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["pagination"]["pages"], 1);
        assert_eq!(body["pagination"]["has_next"], false);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_non_admin_cannot_change_status(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);
        let token = login_token(&server, &user.username).await;
        let id = create_report(&server, &token, "Dumped tyres").await;

        let response = server
            .put(&format!("/api/v1/admin/reports/{}/status", id))
            .authorization_bearer(&token)
            .json(&json!({ "status": "resolved" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["message"], "Admin access required");

        let report = server.get(&format!("/api/v1/reports/{}", id)).await.json::<Value>();
        assert_eq!(report["status"], "pending");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_comments_show_newest_first_with_official_flag(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let admin = seed_user(&pool, true).await;
        let server = test_server(pool);
        let token = login_token(&server, &user.username).await;
        let admin_token = login_token(&server, &admin.username).await;
        let id = create_report(&server, &token, "Burning rubbish").await;

        server
            .post(&format!("/api/v1/reports/{}/comments", id))
            .authorization_bearer(&token)
            .json(&json!({ "content": "Still burning" }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post(&format!("/api/v1/reports/{}/comments", id))
            .authorization_bearer(&admin_token)
            .json(&json!({ "content": "Team dispatched" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(&format!("/api/v1/reports/{}/comments", id))
            .authorization_bearer(&token)
            .json(&json!({ "content": "   " }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let report = server.get(&format!("/api/v1/reports/{}", id)).await.json::<Value>();
        let comments = report["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0]["content"], "Team dispatched");
        assert_eq!(comments[0]["is_official"], true);
        assert_eq!(comments[1]["is_official"], false);

        server
            .post("/api/v1/reports/999999/comments")
            .authorization_bearer(&token)
            .json(&json!({ "content": "Hello?" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_categories_and_health(pool: PgPool) {
        let server = test_server(pool);

        server.get("/health").await.assert_status_ok();

        let categories = server.get("/api/v1/categories").await.json::<Value>();
        assert_eq!(categories.as_array().unwrap().len(), 5);
        assert_eq!(categories[0]["name"], "Water Pollution");

        let legacy = server.get("/api/categories").await.json::<Value>();
        assert_eq!(legacy, categories);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_web_pages_require_a_session(pool: PgPool) {
        let server = test_server(pool);

        let response = server.get("/report/new").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("location"),
            "/login?notice=login_required&next=%2Freport%2Fnew"
        );

        let response = server.get("/logout").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login?notice=login_required");

        server.get("/").await.assert_status_ok();
        server
            .get("/no/such/page")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_web_login_report_and_logout(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);

        let response = server
            .post("/login")
            .form(&[
                ("username", user.username.as_str()),
                ("password", TEST_PASSWORD),
                ("next", "/report/new"),
            ])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/report/new");
        let session = response.cookie("ecoreport_session");

        server
            .get("/report/new")
            .add_cookie(session.clone())
            .await
            .assert_status_ok();

        let response = server
            .post("/report/new")
            .add_cookie(session.clone())
            .form(&[
                ("title", "Sewage leak"),
                ("description", "Smell near the school"),
                ("location", "School street"),
                ("category_id", "1"),
                ("priority", ""),
                ("latitude", ""),
                ("longitude", ""),
            ])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Missing required fields: priority"));

        let response = server
            .post("/report/new")
            .add_cookie(session.clone())
            .form(&[
                ("title", "Sewage leak"),
                ("description", "Smell near the school"),
                ("location", "School street"),
                ("category_id", "1"),
                ("priority", "medium"),
                ("latitude", ""),
                ("longitude", ""),
            ])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.header("location");
        let location = location.to_str().unwrap();
        assert!(location.starts_with("/report/"));
        assert!(location.ends_with("?notice=report_created"));

        let page = server.get(location).add_cookie(session.clone()).await;
        page.assert_status_ok();
        assert!(page.text().contains("Sewage leak"));

        let response = server.get("/logout").add_cookie(session.clone()).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/?notice=logged_out");

        // The old cookie no longer opens a session
        server
            .get("/report/new")
            .add_cookie(session)
            .await
            .assert_status(StatusCode::SEE_OTHER);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_web_admin_pages_turn_away_citizens(pool: PgPool) {
        let user = seed_user(&pool, false).await;
        let server = test_server(pool);

        let response = server
            .post("/login")
            .form(&[("username", user.username.as_str()), ("password", TEST_PASSWORD)])
            .await;
        assert_eq!(response.header("location"), "/?notice=welcome");
        let session = response.cookie("ecoreport_session");

        let response = server.get("/admin/reports").add_cookie(session).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/?notice=access_denied");
    }
}
