use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use minijinja::{context, Value};

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::AuthService;
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::CategoryService;
use crate::features::comments::dtos::CommentResponseDto;
use crate::features::comments::CommentService;
use crate::features::reports::dtos::{parse_status_filter, ReportDetailResponseDto, ReportResponseDto};
use crate::features::reports::models::{ReportFilter, ReportPriority, ReportStatus};
use crate::features::reports::ReportService;
use crate::features::stats::dtos::StatsSummaryDto;
use crate::features::stats::StatsService;
use crate::features::web::forms::{
    CommentForm, LoginForm, LoginPageQuery, NoticeQuery, RegisterForm, ReportForm,
    ReportsFilterQuery, StatusForm,
};
use crate::features::web::session::{safe_next, CurrentUser, RequireLogin, RequireWebAdmin};
use crate::features::web::views::{Notice, Templates};
use crate::shared::constants::{DASHBOARD_RECENT_REPORTS, SESSION_COOKIE};

/// State for the server-rendered pages
#[derive(Clone)]
pub struct WebState {
    pub templates: Arc<Templates>,
    pub auth: Arc<AuthService>,
    pub reports: Arc<ReportService>,
    pub comments: Arc<CommentService>,
    pub categories: Arc<CategoryService>,
    pub stats: Arc<StatsService>,
    pub cookie_secure: bool,
}

impl WebState {
    fn page(
        &self,
        name: &str,
        user: Option<&AuthenticatedUser>,
        notice: Option<Notice>,
        ctx: Value,
    ) -> Response {
        self.page_with_status(StatusCode::OK, name, user, notice, ctx)
    }

    fn page_with_status(
        &self,
        status: StatusCode,
        name: &str,
        user: Option<&AuthenticatedUser>,
        notice: Option<Notice>,
        ctx: Value,
    ) -> Response {
        match self.templates.render(name, user, notice, ctx) {
            Ok(html) => (status, html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render {}: {}", name, e);
                self.error_page(user)
            }
        }
    }

    fn error_page(&self, user: Option<&AuthenticatedUser>) -> Response {
        let body = self
            .templates
            .render("error.html", user, None, context! {})
            .map(|html| html.0)
            .unwrap_or_else(|_| "Internal server error".to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, axum::response::Html(body)).into_response()
    }

    fn not_found_page(&self, user: Option<&AuthenticatedUser>, message: &str) -> Response {
        self.page_with_status(
            StatusCode::NOT_FOUND,
            "not_found.html",
            user,
            None,
            context! { message => message },
        )
    }

    /// Categories for selects and filters; an outage leaves them empty
    async fn categories_or_empty(&self) -> Vec<CategoryResponseDto> {
        self.categories.list().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to load categories: {}", e);
            Vec::new()
        })
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

fn notice(code: Option<&str>) -> Option<Notice> {
    code.and_then(Notice::from_code)
}

fn statuses() -> Vec<&'static str> {
    ReportStatus::ALL.iter().map(ReportStatus::as_str).collect()
}

fn priorities() -> Vec<&'static str> {
    ReportPriority::ALL.iter().map(ReportPriority::as_str).collect()
}

/// Dashboard with headline counts, recent reports and per-category totals
pub async fn dashboard(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NoticeQuery>,
) -> Response {
    let mut notice = notice(query.notice.as_deref());

    let summary = state.stats.summary().await.unwrap_or_else(|e| {
        tracing::warn!("Dashboard stats unavailable: {}", e);
        notice = Notice::from_code("error");
        StatsSummaryDto::default()
    });

    let recent: Vec<ReportResponseDto> = match state.reports.recent(DASHBOARD_RECENT_REPORTS).await {
        Ok(records) => records.into_iter().map(Into::into).collect(),
        Err(e) => {
            tracing::warn!("Recent reports unavailable: {}", e);
            notice = Notice::from_code("error");
            Vec::new()
        }
    };

    state.page(
        "dashboard.html",
        user.as_ref(),
        notice,
        context! {
            total_reports => summary.total_reports,
            pending_reports => summary.by_status.pending,
            resolved_reports => summary.by_status.resolved,
            recent_reports => recent,
            category_stats => summary.by_category,
        },
    )
}

/// Every report, optionally filtered by status and category
pub async fn reports_page(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportsFilterQuery>,
) -> Response {
    let mut notice = notice(query.notice.as_deref());

    let status = match parse_status_filter(query.status.as_deref()) {
        Ok(status) => status,
        Err(_) => {
            notice = Notice::from_code("invalid_status");
            None
        }
    };
    let category_id = query
        .category
        .as_deref()
        .and_then(|c| c.trim().parse::<i64>().ok());

    let reports: Vec<ReportResponseDto> = match state
        .reports
        .list_all(ReportFilter {
            status,
            category_id,
        })
        .await
    {
        Ok(records) => records.into_iter().map(Into::into).collect(),
        Err(e) => {
            tracing::warn!("Failed to list reports for web: {}", e);
            notice = Notice::from_code("error");
            Vec::new()
        }
    };

    let categories = state.categories_or_empty().await;

    state.page(
        "reports.html",
        user.as_ref(),
        notice,
        context! {
            reports => reports,
            categories => categories,
            statuses => statuses(),
            current_status => status.map(|s| s.as_str()).unwrap_or("all"),
            current_category => category_id.map(|id| id.to_string()).unwrap_or_else(|| "all".to_string()),
        },
    )
}

/// One report with its comments
pub async fn report_detail(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Query(query): Query<NoticeQuery>,
) -> Response {
    let record = match state.reports.get_by_id(id).await {
        Ok(record) => record,
        Err(AppError::NotFound(msg)) => return state.not_found_page(user.as_ref(), &msg),
        Err(e) => {
            tracing::error!("Failed to load report {}: {}", id, e);
            return Redirect::to("/reports?notice=error").into_response();
        }
    };

    let comments: Vec<CommentResponseDto> = match state.comments.list_for_report(id).await {
        Ok(comments) => comments.into_iter().map(Into::into).collect(),
        Err(e) => {
            tracing::error!("Failed to load comments for report {}: {}", id, e);
            return Redirect::to("/reports?notice=error").into_response();
        }
    };

    state.page(
        "report_detail.html",
        user.as_ref(),
        notice(query.notice.as_deref()),
        context! {
            report => ReportDetailResponseDto::new(record, comments),
            statuses => statuses(),
        },
    )
}

pub async fn register_page(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    state.page(
        "register.html",
        None,
        None,
        context! { form => RegisterForm::default() },
    )
}

pub async fn register_submit(
    State(state): State<WebState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match state.auth.register(form.to_dto()).await {
        Ok(_) => Redirect::to("/login?notice=registered").into_response(),
        Err(e) => {
            let status = e.status_code();
            state.page_with_status(
                status,
                "register.html",
                None,
                Some(Notice::error(e.public_message())),
                context! { form => form },
            )
        }
    }
}

pub async fn login_page(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<LoginPageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(safe_next(query.next.as_deref()).unwrap_or("/")).into_response();
    }

    state.page(
        "login.html",
        None,
        notice(query.notice.as_deref()),
        context! { next => safe_next(query.next.as_deref()) },
    )
}

/// Check credentials, start a session and follow `next` when it is local
pub async fn login_submit(
    State(state): State<WebState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).map(str::to_string);
    let username = form.username.trim();

    let rejected = |state: &WebState, status: StatusCode, message: String| {
        state.page_with_status(
            status,
            "login.html",
            None,
            Some(Notice::error(message)),
            context! { next => next.clone(), username => username },
        )
    };

    if username.is_empty() || form.password.is_empty() {
        return rejected(
            &state,
            StatusCode::BAD_REQUEST,
            "Username and password required".to_string(),
        );
    }

    let user = match state.auth.authenticate(username, &form.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return rejected(
                &state,
                StatusCode::UNAUTHORIZED,
                "Invalid username or password!".to_string(),
            )
        }
        Err(e) => return rejected(&state, e.status_code(), e.public_message()),
    };

    let token = match state.auth.start_session(user.id).await {
        Ok(token) => token,
        Err(e) => return rejected(&state, e.status_code(), e.public_message()),
    };

    tracing::info!("User {} signed in to the web UI", user.id);

    let target = next.unwrap_or_else(|| "/?notice=welcome".to_string());
    (jar.add(state.session_cookie(token)), Redirect::to(&target)).into_response()
}

/// End the session. Only signed-in users can log out; there is no point in
/// returning here after logging in, so no `next` is attached.
pub async fn logout(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Response {
    let Some(user) = user else {
        return Redirect::to("/login?notice=login_required").into_response();
    };

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.auth.end_session(cookie.value()).await {
            tracing::warn!("Failed to end session: {}", e);
        }
    }

    tracing::info!("User {} signed out of the web UI", user.id);

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Redirect::to("/?notice=logged_out")).into_response()
}

pub async fn new_report_page(
    State(state): State<WebState>,
    RequireLogin(user): RequireLogin,
) -> Response {
    let categories = state.categories_or_empty().await;

    state.page(
        "new_report.html",
        Some(&user),
        None,
        context! {
            form => ReportForm::default(),
            categories => categories,
            priorities => priorities(),
        },
    )
}

pub async fn new_report_submit(
    State(state): State<WebState>,
    RequireLogin(user): RequireLogin,
    Form(form): Form<ReportForm>,
) -> Response {
    let created = match form.to_dto() {
        Ok(dto) => match dto.into_create_report(user.id) {
            Ok(data) => state.reports.create(&data).await,
            Err(e) => Err(e),
        },
        Err(message) => Err(AppError::Validation(message)),
    };

    match created {
        Ok(report) => {
            Redirect::to(&format!("/report/{}?notice=report_created", report.id)).into_response()
        }
        Err(e) => {
            let status = e.status_code();
            let message = e.public_message();
            let categories = state.categories_or_empty().await;
            state.page_with_status(
                status,
                "new_report.html",
                Some(&user),
                Some(Notice::error(message)),
                context! {
                    form => form,
                    categories => categories,
                    priorities => priorities(),
                },
            )
        }
    }
}

pub async fn add_comment(
    State(state): State<WebState>,
    RequireLogin(user): RequireLogin,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Response {
    let content = form.content.trim();
    if content.is_empty() {
        return Redirect::to(&format!("/report/{}?notice=comment_empty", id)).into_response();
    }

    match state.comments.create(id, user.id, content).await {
        Ok(_) => Redirect::to(&format!("/report/{}?notice=comment_added", id)).into_response(),
        Err(AppError::NotFound(msg)) => state.not_found_page(Some(&user), &msg),
        Err(e) => {
            tracing::error!("Failed to add comment to report {}: {}", id, e);
            Redirect::to(&format!("/report/{}?notice=error", id)).into_response()
        }
    }
}

/// Admin overview of every report with inline status controls
pub async fn admin_reports(
    State(state): State<WebState>,
    RequireWebAdmin(user): RequireWebAdmin,
    Query(query): Query<NoticeQuery>,
) -> Response {
    let mut notice = notice(query.notice.as_deref());

    let reports: Vec<ReportResponseDto> = match state.reports.list_all(ReportFilter::default()).await {
        Ok(records) => records.into_iter().map(Into::into).collect(),
        Err(e) => {
            tracing::warn!("Failed to list reports for admin: {}", e);
            notice = Notice::from_code("error");
            Vec::new()
        }
    };

    state.page(
        "admin_reports.html",
        Some(&user),
        notice,
        context! {
            reports => reports,
            statuses => statuses(),
        },
    )
}

pub async fn update_status(
    State(state): State<WebState>,
    RequireWebAdmin(user): RequireWebAdmin,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Response {
    let Ok(status) = form.status.parse::<ReportStatus>() else {
        return Redirect::to(&format!("/report/{}?notice=invalid_status", id)).into_response();
    };

    match state.reports.update_status(id, status).await {
        Ok(_) => Redirect::to(&format!("/report/{}?notice=status_updated", id)).into_response(),
        Err(AppError::NotFound(msg)) => state.not_found_page(Some(&user), &msg),
        Err(e) => {
            tracing::error!("Failed to update status of report {}: {}", id, e);
            Redirect::to(&format!("/report/{}?notice=error", id)).into_response()
        }
    }
}

/// Fallback for unknown paths
pub async fn not_found(State(state): State<WebState>, CurrentUser(user): CurrentUser) -> Response {
    state.not_found_page(user.as_ref(), "The page you were looking for does not exist.")
}
