use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::CommentResponseDto;
use crate::features::comments::services::CommentService;
use crate::features::reports::dtos::{
    CreateReportDto, CreateReportResponseDto, ReportDetailResponseDto, ReportListQuery,
    ReportListResponseDto, ReportResponseDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::types::{ErrorResponse, PaginationMeta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub comment_service: Arc<CommentService>,
}

/// List reports with optional filters, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Page of reports", body = ReportListResponseDto),
        (status = 400, description = "Unknown status filter", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<ReportState>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<ReportListResponseDto>> {
    let filter = query.filter()?;
    let pagination = query.pagination();

    let (reports, total) = state.report_service.list(filter, &pagination).await?;

    Ok(Json(ReportListResponseDto {
        reports: reports.into_iter().map(ReportResponseDto::from).collect(),
        pagination: PaginationMeta::new(&pagination, total),
    }))
}

/// Get report by ID with its comments
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ReportDetailResponseDto),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<ReportState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ReportDetailResponseDto>> {
    let report = state.report_service.get_by_id(id).await?;
    let comments = state.comment_service.list_for_report(id).await?;

    Ok(Json(ReportDetailResponseDto::new(
        report,
        comments.into_iter().map(CommentResponseDto::from).collect(),
    )))
}

/// Submit a new report as the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created", body = CreateReportResponseDto),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<CreateReportResponseDto>)> {
    let report = state
        .report_service
        .create(&dto.into_create_report(user.id)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateReportResponseDto {
            message: "Report created successfully".to_string(),
            report_id: report.id,
        }),
    ))
}
