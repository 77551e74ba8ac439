use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::admin::dtos::*;
use crate::features::auth::guards::RequireAdmin;
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::reports::services::ReportService;
use crate::shared::types::ErrorResponse;

/// Change the status of a report (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/admin/reports/{id}/status",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = UpdateReportStatusResponseDto),
        (status = 400, description = "Status missing or invalid", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin access required", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_report_status(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ReportService>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<UpdateReportStatusResponseDto>> {
    let status = dto.parse_status()?;
    let report = service.update_status(id, status).await?;

    tracing::info!("Admin {} set report {} to {}", admin.id, id, status);

    Ok(Json(UpdateReportStatusResponseDto {
        message: "Status updated successfully".to_string(),
        report: ReportResponseDto::from(report),
    }))
}
