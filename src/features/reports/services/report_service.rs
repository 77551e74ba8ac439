use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    CreateReport, Report, ReportFilter, ReportRecord, ReportStatus,
};
use crate::shared::types::PaginationQuery;

/// Columns of [`ReportRecord`]: the report, its reporter and its category
const RECORD_SELECT: &str = r#"
    SELECT r.id, r.title, r.description, r.location, r.latitude, r.longitude,
           r.status, r.priority, r.user_id, r.category_id, r.created_at, r.updated_at,
           u.username AS reporter_username,
           u.full_name AS reporter_full_name,
           u.email AS reporter_email,
           c.name AS category_name,
           c.description AS category_description,
           c.icon AS category_icon
    FROM reports r
    JOIN users u ON u.id = r.user_id
    JOIN categories c ON c.id = r.category_id
"#;

/// Optional filters bound as $1 (status) and $2 (category id)
const FILTER_CLAUSE: &str = r#"
    WHERE ($1::report_status IS NULL OR r.status = $1)
      AND ($2::bigint IS NULL OR r.category_id = $2)
"#;

const NEWEST_FIRST: &str = "ORDER BY r.created_at DESC, r.id DESC";

/// Service for report operations
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of reports matching the filter, newest first, plus the total
    /// number of matches
    pub async fn list(
        &self,
        filter: ReportFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ReportRecord>, i64)> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM reports r {}",
            FILTER_CLAUSE
        ))
        .bind(filter.status)
        .bind(filter.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reports: {:?}", e);
            AppError::Database(e)
        })?;

        let reports = sqlx::query_as::<_, ReportRecord>(&format!(
            "{} {} {} LIMIT $3 OFFSET $4",
            RECORD_SELECT, FILTER_CLAUSE, NEWEST_FIRST
        ))
        .bind(filter.status)
        .bind(filter.category_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((reports, total))
    }

    /// Every report matching the filter, newest first
    pub async fn list_all(&self, filter: ReportFilter) -> Result<Vec<ReportRecord>> {
        sqlx::query_as::<_, ReportRecord>(&format!(
            "{} {} {}",
            RECORD_SELECT, FILTER_CLAUSE, NEWEST_FIRST
        ))
        .bind(filter.status)
        .bind(filter.category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list all reports: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<ReportRecord>> {
        sqlx::query_as::<_, ReportRecord>(&format!("{} {} LIMIT $1", RECORD_SELECT, NEWEST_FIRST))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list recent reports: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ReportRecord> {
        sqlx::query_as::<_, ReportRecord>(&format!("{} WHERE r.id = $1", RECORD_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report by id: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Insert a report as `pending`. An unknown category is a client error.
    pub async fn create(&self, data: &CreateReport) -> Result<Report> {
        let mut tx = self.pool.begin().await?;

        let category_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(data.category_id)
                .fetch_one(&mut *tx)
                .await?;
        if !category_exists {
            return Err(AppError::BadRequest(format!(
                "Category {} does not exist",
                data.category_id
            )));
        }

        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports
                (title, description, location, latitude, longitude, priority, user_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, location, latitude, longitude,
                      status, priority, user_id, category_id, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.location)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.priority)
        .bind(data.user_id)
        .bind(data.category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!(
            "Created report: {} by user: {} (category={}, priority={})",
            report.id,
            report.user_id,
            report.category_id,
            report.priority
        );

        Ok(report)
    }

    /// Set the status and stamp `updated_at`. Any status may follow any other.
    pub async fn update_status(&self, id: i64, status: ReportStatus) -> Result<ReportRecord> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<ReportStatus> =
            sqlx::query_scalar("SELECT status FROM reports WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous) = previous else {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        };

        sqlx::query(
            r#"
            UPDATE reports
            SET status = $2, updated_at = GREATEST(NOW(), created_at)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?;

        let record = sqlx::query_as::<_, ReportRecord>(&format!("{} WHERE r.id = $1", RECORD_SELECT))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Updated report {} status: {} -> {}",
            id,
            previous,
            status
        );

        Ok(record)
    }
}
