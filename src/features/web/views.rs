//! Server-rendered pages.
//!
//! Templates are compiled into the binary and rendered with minijinja.
//! `.html` templates are auto-escaped.

use axum::response::Html;
use chrono::DateTime;
use minijinja::{context, Environment, Value};
use serde::Serialize;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/web/base.html")),
    ("dashboard.html", include_str!("../../../templates/web/dashboard.html")),
    ("reports.html", include_str!("../../../templates/web/reports.html")),
    (
        "report_detail.html",
        include_str!("../../../templates/web/report_detail.html"),
    ),
    ("new_report.html", include_str!("../../../templates/web/new_report.html")),
    ("register.html", include_str!("../../../templates/web/register.html")),
    ("login.html", include_str!("../../../templates/web/login.html")),
    (
        "admin_reports.html",
        include_str!("../../../templates/web/admin_reports.html"),
    ),
    ("not_found.html", include_str!("../../../templates/web/not_found.html")),
    ("error.html", include_str!("../../../templates/web/error.html")),
];

/// Compiled page templates
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_filter("datetime", format_datetime);

        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    /// Render a page. The signed-in user and the notice are available to every
    /// template as `current_user` and `notice`.
    pub fn render(
        &self,
        name: &str,
        current_user: Option<&AuthenticatedUser>,
        notice: Option<Notice>,
        ctx: Value,
    ) -> Result<Html<String>> {
        let template = self.env.get_template(name)?;
        let html = template.render(context! {
            current_user => current_user,
            notice => notice,
            ..ctx
        })?;
        Ok(Html(html))
    }
}

/// `2025-03-01T08:15:00Z` -> `01 Mar 2025 08:15`; anything unparsable is shown as is
fn format_datetime(value: String) -> String {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.format("%d %b %Y %H:%M").to_string())
        .unwrap_or(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// One-shot message shown at the top of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Notice for a `?notice=<code>` query parameter. Unknown codes show nothing.
    pub fn from_code(code: &str) -> Option<Self> {
        let notice = match code {
            "registered" => Notice::success("Registration successful! Please log in."),
            "welcome" => Notice::success("Welcome back!"),
            "logged_out" => Notice::info("You have been logged out."),
            "login_required" => Notice::info("Please log in to access this page."),
            "report_created" => Notice::success("Report submitted successfully!"),
            "comment_added" => Notice::success("Comment added successfully!"),
            "comment_empty" => Notice::error("Comment cannot be empty!"),
            "status_updated" => Notice::success("Report status updated."),
            "invalid_status" => Notice::error("Invalid status!"),
            "access_denied" => Notice::error("Access denied! Admins only."),
            "error" => Notice::error("Something went wrong. Please try again."),
            _ => return None,
        };
        Some(notice)
    }
}
