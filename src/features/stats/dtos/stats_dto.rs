use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::stats::models::{CategoryCount, ReportCounts};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCountsDto {
    pub pending: i64,
    pub investigating: i64,
    pub resolved: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriorityCountsDto {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCountDto {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub count: i64,
}

impl From<CategoryCount> for CategoryCountDto {
    fn from(c: CategoryCount) -> Self {
        Self {
            id: c.id,
            name: c.name,
            icon: c.icon,
            count: c.count,
        }
    }
}

/// Aggregate report statistics, computed at request time
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StatsSummaryDto {
    pub total_reports: i64,
    pub total_users: i64,
    pub by_status: StatusCountsDto,
    pub by_priority: PriorityCountsDto,
    /// Every category, including those without reports
    pub by_category: Vec<CategoryCountDto>,
}

impl StatsSummaryDto {
    pub fn new(counts: ReportCounts, total_users: i64, categories: Vec<CategoryCount>) -> Self {
        Self {
            total_reports: counts.total,
            total_users,
            by_status: StatusCountsDto {
                pending: counts.pending,
                investigating: counts.investigating,
                resolved: counts.resolved,
            },
            by_priority: PriorityCountsDto {
                low: counts.low,
                medium: counts.medium,
                high: counts.high,
                critical: counts.critical,
            },
            by_category: categories.into_iter().map(CategoryCountDto::from).collect(),
        }
    }
}
