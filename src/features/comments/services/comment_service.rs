use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::comments::models::{Comment, CommentRecord};

/// Service for comment operations
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comments of a report, newest first
    pub async fn list_for_report(&self, report_id: i64) -> Result<Vec<CommentRecord>> {
        sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT c.id, c.report_id, c.user_id, c.content, c.is_official, c.created_at,
                   u.username AS author_username, u.full_name AS author_full_name
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.report_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments for report {}: {:?}", report_id, e);
            AppError::Database(e)
        })
    }

    /// Append a comment. `is_official` is taken from the author's admin flag
    /// as stored at this moment.
    pub async fn create(&self, report_id: i64, user_id: i64, content: &str) -> Result<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Comment content required".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let report_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reports WHERE id = $1)")
                .bind(report_id)
                .fetch_one(&mut *tx)
                .await?;
        if !report_exists {
            return Err(AppError::NotFound(format!("Report {} not found", report_id)));
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (report_id, user_id, content, is_official)
            SELECT $1, u.id, $3, u.is_admin
            FROM users u
            WHERE u.id = $2
            RETURNING id, report_id, user_id, content, is_official, created_at
            "#,
        )
        .bind(report_id)
        .bind(user_id)
        .bind(content)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        tx.commit().await?;

        tracing::info!(
            "Created comment: {} on report: {} (official={})",
            comment.id,
            comment.report_id,
            comment.is_official
        );

        Ok(comment)
    }
}
