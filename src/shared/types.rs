use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Body returned for every failed API request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            message,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Pagination query parameters for list endpoints
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Page number, never below 1
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Get clamped page size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }

    /// Calculate SQL OFFSET from page number. Saturates for absurd page
    /// numbers, which then simply select nothing.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub page: i64,
    pub pages: i64,
    pub per_page: i64,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(query: &PaginationQuery, total: i64) -> Self {
        let page = query.page();
        let per_page = query.limit();
        let total = total.max(0);
        // Ceiling division; zero items means zero pages
        let pages = (total + per_page - 1) / per_page;

        Self {
            page,
            pages,
            per_page,
            total,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, per_page: i64) -> PaginationQuery {
        PaginationQuery { page, per_page }
    }

    #[test]
    fn test_offset_and_limit() {
        assert_eq!(query(1, 10).offset(), 0);
        assert_eq!(query(3, 10).offset(), 20);
        assert_eq!(query(0, 10).offset(), 0);
        assert_eq!(query(-4, 10).page(), 1);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        assert_eq!(query(i64::MAX, 10).offset(), i64::MAX);
        assert_eq!(query(i64::MAX, MAX_PAGE_SIZE).offset(), i64::MAX);

        let meta = PaginationMeta::new(&query(i64::MAX, 10), 3);
        assert_eq!(meta.pages, 1);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(query(1, 0).limit(), 1);
        assert_eq!(query(1, 1000).limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_meta_for_partial_last_page() {
        let meta = PaginationMeta::new(&query(2, 10), 25);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.total, 25);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let last = PaginationMeta::new(&query(3, 10), 25);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_meta_for_empty_result() {
        let meta = PaginationMeta::new(&PaginationQuery::default(), 0);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.pages, 0);
        assert_eq!(meta.per_page, DEFAULT_PAGE_SIZE);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_meta_exact_multiple() {
        let meta = PaginationMeta::new(&query(1, 5), 10);
        assert_eq!(meta.pages, 2);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_error_response_omits_empty_errors() {
        let body = serde_json::to_value(ErrorResponse::new("Token missing".into(), None)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "message": "Token missing" })
        );
    }
}
