use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::stats::dtos::StatsSummaryDto;
use crate::features::stats::services::StatsService;

/// Report and user statistics
#[utoipa::path(
    get,
    path = "/api/v1/stats/summary",
    responses(
        (status = 200, description = "Statistics summary", body = StatsSummaryDto)
    ),
    tag = "stats"
)]
pub async fn get_summary(
    State(service): State<Arc<StatsService>>,
) -> Result<Json<StatsSummaryDto>> {
    let summary = service.summary().await?;
    Ok(Json(summary))
}
