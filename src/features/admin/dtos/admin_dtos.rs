use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::reports::models::ReportStatus;

/// Request DTO for changing a report's status
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    /// One of pending, investigating, resolved
    pub status: Option<String>,
}

impl UpdateReportStatusDto {
    pub fn parse_status(&self) -> Result<ReportStatus> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Err(AppError::BadRequest("Status required".to_string())),
            Some(raw) => raw.parse().map_err(AppError::Validation),
        }
    }
}

/// Response DTO for a status change
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportStatusResponseDto {
    pub message: String,
    pub report: ReportResponseDto,
}
