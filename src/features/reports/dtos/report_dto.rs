use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::comments::dtos::CommentResponseDto;
use crate::features::reports::models::{
    CreateReport, ReportFilter, ReportPriority, ReportRecord, ReportStatus,
};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::{PaginationMeta, PaginationQuery};
use crate::shared::validation::{non_empty, validation_error};

/// Query parameters for listing reports.
///
/// Numbers are taken leniently: an unparsable `page`, `per_page` or
/// `category_id` falls back to its default instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    /// Page number (1-indexed, default: 1)
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    /// Items per page (default: 10, max: 100)
    #[param(value_type = Option<i64>)]
    pub per_page: Option<String>,
    /// One of pending, investigating, resolved; empty or "all" means no filter
    pub status: Option<String>,
    /// Category id
    #[param(value_type = Option<i64>)]
    pub category_id: Option<String>,
}

impl ReportListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: parse_number(self.page.as_deref()).unwrap_or(1),
            per_page: parse_number(self.per_page.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Build the list filter. An unknown status is rejected.
    pub fn filter(&self) -> Result<ReportFilter> {
        Ok(ReportFilter {
            status: parse_status_filter(self.status.as_deref())?,
            category_id: parse_number(self.category_id.as_deref()),
        })
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// `None`, empty and "all" mean no status filter
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<ReportStatus>> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(AppError::Validation),
    }
}

/// Category as nested in a report list item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportCategoryDto {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
}

/// Category as nested in a report detail
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportCategoryDetailDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Reporter as nested in a report list item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReporterDto {
    pub id: i64,
    pub full_name: String,
}

/// Reporter as nested in a report detail
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReporterDetailDto {
    pub id: i64,
    pub full_name: String,
    pub email: String,
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: ReportStatus,
    pub priority: ReportPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: ReportCategoryDto,
    pub reporter: ReporterDto,
}

impl From<ReportRecord> for ReportResponseDto {
    fn from(record: ReportRecord) -> Self {
        let r = record.report;
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            location: r.location,
            latitude: r.latitude,
            longitude: r.longitude,
            status: r.status,
            priority: r.priority,
            created_at: r.created_at,
            updated_at: r.updated_at,
            category: ReportCategoryDto {
                id: r.category_id,
                name: record.category_name,
                icon: record.category_icon,
            },
            reporter: ReporterDto {
                id: r.user_id,
                full_name: record.reporter_full_name,
            },
        }
    }
}

/// Response DTO for report with comments
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportDetailResponseDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: ReportStatus,
    pub priority: ReportPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: ReportCategoryDetailDto,
    pub reporter: ReporterDetailDto,
    /// Newest first
    pub comments: Vec<CommentResponseDto>,
}

impl ReportDetailResponseDto {
    pub fn new(record: ReportRecord, comments: Vec<CommentResponseDto>) -> Self {
        let r = record.report;
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            location: r.location,
            latitude: r.latitude,
            longitude: r.longitude,
            status: r.status,
            priority: r.priority,
            created_at: r.created_at,
            updated_at: r.updated_at,
            category: ReportCategoryDetailDto {
                id: r.category_id,
                name: record.category_name,
                description: record.category_description,
                icon: record.category_icon,
            },
            reporter: ReporterDetailDto {
                id: r.user_id,
                full_name: record.reporter_full_name,
                email: record.reporter_email,
            },
            comments,
        }
    }
}

/// Paginated report list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportListResponseDto {
    pub reports: Vec<ReportResponseDto>,
    pub pagination: PaginationMeta,
}

/// Request DTO for creating a report
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(
        required,
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,

    #[validate(required)]
    pub description: Option<String>,

    #[validate(
        required,
        length(max = 200, message = "Location must be at most 200 characters")
    )]
    pub location: Option<String>,

    #[validate(required)]
    pub category_id: Option<i64>,

    #[validate(required)]
    pub priority: Option<ReportPriority>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,
}

impl CreateReportDto {
    /// Trim the text fields, validate, and attach the reporter
    pub fn into_create_report(self, user_id: i64) -> Result<CreateReport> {
        let dto = CreateReportDto {
            title: self.title.and_then(non_empty),
            description: self.description.and_then(non_empty),
            location: self.location.and_then(non_empty),
            ..self
        };
        dto.validate().map_err(validation_error)?;

        let (Some(title), Some(description), Some(location), Some(category_id), Some(priority)) = (
            dto.title,
            dto.description,
            dto.location,
            dto.category_id,
            dto.priority,
        ) else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        Ok(CreateReport {
            title,
            description,
            location,
            latitude: dto.latitude,
            longitude: dto.longitude,
            priority,
            user_id,
            category_id,
        })
    }
}

/// Response DTO for a created report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReportResponseDto {
    pub message: String,
    pub report_id: i64,
}
