/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Number of reports shown on the dashboard
pub const DASHBOARD_RECENT_REPORTS: i64 = 5;

/// Cookie carrying the web session token
pub const SESSION_COOKIE: &str = "ecoreport_session";
