pub mod stats_handler;

pub use stats_handler::{__path_get_summary, get_summary};
