use sqlx::PgPool;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::users::models::{CreateUser, User};

/// Service for user persistence
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, phone, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user by id: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, phone, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user by username: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Insert a user, rejecting a taken username or email with a 400.
    ///
    /// The existence checks give a precise message; the unique constraints still
    /// catch two registrations racing for the same name.
    pub async fn create(&self, data: &CreateUser) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(&data.username)
                .fetch_one(&mut *tx)
                .await?;
        if username_taken {
            return Err(AppError::BadRequest("Username already exists".to_string()));
        }

        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(&data.email)
                .fetch_one(&mut *tx)
                .await?;
        if email_taken {
            return Err(AppError::BadRequest("Email already exists".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, phone, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, full_name, phone, is_admin, created_at
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.full_name)
        .bind(&data.phone)
        .bind(data.is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_username_key") {
                AppError::BadRequest("Username already exists".to_string())
            } else if is_unique_violation(&e, "users_email_key") {
                AppError::BadRequest("Email already exists".to_string())
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tx.commit().await?;

        tracing::info!(
            "Created user: {} ({}), admin={}",
            user.id,
            user.username,
            user.is_admin
        );

        Ok(user)
    }
}
