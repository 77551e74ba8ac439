use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::comments::{dtos as comments_dtos, handlers as comments_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::stats::{dtos as stats_dtos, handlers as stats_handlers};
use crate::shared::types::{ErrorResponse, PaginationMeta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_me,
        // Categories (public)
        categories_handlers::list_categories,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::create_report,
        // Comments
        comments_handlers::create_comment,
        // Stats (public)
        stats_handlers::get_summary,
        // Admin
        admin_handlers::update_report_status,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            // Auth
            auth::dtos::RegisterRequestDto,
            auth::dtos::RegisterResponseDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::LoginResponseDto,
            auth::dtos::AuthUserDto,
            auth::dtos::UserProfileDto,
            // Categories
            categories_dtos::CategoryResponseDto,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportPriority,
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportDetailResponseDto,
            reports_dtos::ReportListResponseDto,
            reports_dtos::ReportCategoryDto,
            reports_dtos::ReportCategoryDetailDto,
            reports_dtos::ReporterDto,
            reports_dtos::ReporterDetailDto,
            reports_dtos::CreateReportDto,
            reports_dtos::CreateReportResponseDto,
            // Comments
            comments_dtos::CreateCommentDto,
            comments_dtos::CreateCommentResponseDto,
            comments_dtos::CommentResponseDto,
            comments_dtos::CommentAuthorDto,
            // Stats
            stats_dtos::StatsSummaryDto,
            stats_dtos::StatusCountsDto,
            stats_dtos::PriorityCountsDto,
            stats_dtos::CategoryCountDto,
            // Admin
            admin_dtos::UpdateReportStatusDto,
            admin_dtos::UpdateReportStatusResponseDto,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and bearer tokens"),
        (name = "categories", description = "Report categories (public)"),
        (name = "reports", description = "Environmental incident reports"),
        (name = "comments", description = "Comments on reports"),
        (name = "stats", description = "Report statistics (public)"),
        (name = "admin", description = "Admin endpoints (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "EcoReport API",
        version = "0.1.0",
        description = "API documentation for EcoReport",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
