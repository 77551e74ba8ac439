use sqlx::FromRow;

/// Report totals by status and priority, from a single scan of `reports`
#[derive(Debug, Clone, Default, FromRow)]
pub struct ReportCounts {
    pub total: i64,
    pub pending: i64,
    pub investigating: i64,
    pub resolved: i64,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

/// Number of reports filed under one category
#[derive(Debug, Clone, FromRow)]
pub struct CategoryCount {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub count: i64,
}
