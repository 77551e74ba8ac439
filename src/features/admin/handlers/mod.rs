pub mod admin_handlers;

pub use admin_handlers::{__path_update_report_status, update_report_status};
