mod report_counts;

pub use report_counts::{CategoryCount, ReportCounts};
