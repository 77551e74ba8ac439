use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::stats::dtos::StatsSummaryDto;
use crate::features::stats::models::{CategoryCount, ReportCounts};

/// Service for report statistics
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Totals by status, priority and category. The queries share one snapshot
    /// so the breakdowns always add up to the total.
    pub async fn summary(&self) -> Result<StatsSummaryDto> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let counts = sqlx::query_as::<_, ReportCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'investigating') AS investigating,
                COUNT(*) FILTER (WHERE status = 'resolved') AS resolved,
                COUNT(*) FILTER (WHERE priority = 'low') AS low,
                COUNT(*) FILTER (WHERE priority = 'medium') AS medium,
                COUNT(*) FILTER (WHERE priority = 'high') AS high,
                COUNT(*) FILTER (WHERE priority = 'critical') AS critical
            FROM reports
            "#,
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reports: {:?}", e);
            AppError::Database(e)
        })?;

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let categories = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT c.id, c.name, c.icon, COUNT(r.id) AS count
            FROM categories c
            LEFT JOIN reports r ON r.category_id = c.id
            GROUP BY c.id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reports per category: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        Ok(StatsSummaryDto::new(counts, total_users, categories))
    }
}
