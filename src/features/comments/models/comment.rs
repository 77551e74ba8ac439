use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for comment
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub report_id: i64,
    pub user_id: i64,
    pub content: String,
    pub is_official: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author
#[derive(Debug, Clone, FromRow)]
pub struct CommentRecord {
    #[sqlx(flatten)]
    pub comment: Comment,
    pub author_username: String,
    pub author_full_name: String,
}
