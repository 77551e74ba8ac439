use base64::Engine;
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::users::models::User;

/// Server-side web sessions.
///
/// The cookie carries a random token; the table stores only its SHA-256 digest,
/// so a leaked table cannot be replayed as cookies.
pub struct SessionService {
    pool: PgPool,
    ttl: Duration,
}

impl SessionService {
    pub fn new(pool: PgPool, ttl: std::time::Duration) -> Self {
        Self {
            pool,
            ttl: Duration::seconds(ttl.as_secs() as i64),
        }
    }

    /// Open a session for the user and return the cookie token
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        let expires_at = Utc::now() + self.ttl;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM web_sessions WHERE expires_at <= NOW()")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO web_sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token_digest(&token))
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create web session: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!("Opened web session for user: {}", user_id);
        Ok(token)
    }

    /// User owning an unexpired session, if any
    pub async fn resolve(&self, token: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.full_name, u.phone,
                   u.is_admin, u.created_at
            FROM web_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token_digest(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve web session: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn destroy(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM web_sessions WHERE token_hash = $1")
            .bind(token_digest(token))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to destroy web session: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}

/// 32 random bytes, URL-safe base64 without padding
fn generate_token() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
