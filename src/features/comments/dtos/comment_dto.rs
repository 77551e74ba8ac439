use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::comments::models::CommentRecord;

/// Request DTO for adding a comment
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentDto {
    pub content: Option<String>,
}

/// Response DTO for a created comment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentResponseDto {
    pub message: String,
    pub comment_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentAuthorDto {
    pub id: i64,
    pub full_name: String,
}

/// Response DTO for comment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// True when the author was an admin at the time of writing
    pub is_official: bool,
    pub author: CommentAuthorDto,
}

impl From<CommentRecord> for CommentResponseDto {
    fn from(record: CommentRecord) -> Self {
        let c = record.comment;
        Self {
            id: c.id,
            content: c.content,
            created_at: c.created_at,
            is_official: c.is_official,
            author: CommentAuthorDto {
                id: c.user_id,
                full_name: record.author_full_name,
            },
        }
    }
}
