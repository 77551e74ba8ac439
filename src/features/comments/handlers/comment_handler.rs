use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{CreateCommentDto, CreateCommentResponseDto};
use crate::features::comments::services::CommentService;
use crate::shared::types::ErrorResponse;

/// Add a comment to a report
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/comments",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment added", body = CreateCommentResponseDto),
        (status = 400, description = "Comment content required", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    AppPath(report_id): AppPath<i64>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<CreateCommentResponseDto>)> {
    let content = dto.content.unwrap_or_default();
    let comment = service.create(report_id, user.id, &content).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCommentResponseDto {
            message: "Comment added successfully".to_string(),
            comment_id: comment.id,
        }),
    ))
}
