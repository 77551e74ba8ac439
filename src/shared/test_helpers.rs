use std::time::Duration;

use axum_test::TestServer;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::app::{self, AppContext};
use crate::core::config::{
    AdminBootstrapConfig, AppConfig, AuthConfig, Config, DatabaseConfig, SwaggerConfig,
};
use crate::features::auth::services::password::hash_password;
use crate::features::users::models::{CreateUser, User};
use crate::features::users::UserService;

/// Password given to every seeded user
pub const TEST_PASSWORD: &str = "river-watch-2025";

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
            max_request_body_size: 1024 * 1024,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/ecoreport_test".to_string(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 60,
            max_lifetime_secs: 300,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            jwt_leeway: Duration::from_secs(0),
            session_ttl: Duration::from_secs(60 * 60),
            session_cookie_secure: false,
        },
        admin: AdminBootstrapConfig {
            username: "admin".to_string(),
            email: "admin@ecoreport.local".to_string(),
            full_name: "Administrator".to_string(),
            password: None,
        },
        swagger: SwaggerConfig {
            username: None,
            password: None,
            title: "EcoReport API".to_string(),
            version: "0.1.0".to_string(),
            description: "Test".to_string(),
        },
    }
}

/// Full application router over the given pool
pub fn test_server(pool: PgPool) -> TestServer {
    let config = test_config();
    let ctx = AppContext::new(pool, &config).expect("app context");
    TestServer::new(app::router(&ctx, &config)).expect("test server")
}

/// Insert a user with a random name and [`TEST_PASSWORD`]
pub async fn seed_user(pool: &PgPool, is_admin: bool) -> User {
    let username = format!("user_{}", (100_000..999_999).fake::<u32>());
    UserService::new(pool.clone())
        .create(&CreateUser {
            email: format!("{}@example.com", username),
            username,
            password_hash: hash_password(TEST_PASSWORD).expect("hash"),
            full_name: Name().fake(),
            phone: None,
            is_admin,
        })
        .await
        .expect("seed user")
}

/// Log in through the API and return the bearer token
pub async fn login_token(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

/// Create a report in the first category through the API and return its id
pub async fn create_report(server: &TestServer, token: &str, title: &str) -> i64 {
    create_report_in(server, token, title, 1).await
}

pub async fn create_report_in(
    server: &TestServer,
    token: &str,
    title: &str,
    category_id: i64,
) -> i64 {
    let response = server
        .post("/api/v1/reports")
        .authorization_bearer(token)
        .json(&json!({
            "title": title,
            "description": "Dark water near the outflow pipe",
            "location": "North bridge",
            "category_id": category_id,
            "priority": "high",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["report_id"]
        .as_i64()
        .expect("report_id in response")
}
