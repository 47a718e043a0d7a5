//! CLI command implementations

mod analyze;
mod check_data;
mod normalize;

pub use analyze::execute_analyze_command;
pub use check_data::execute_check_data_command;
pub use normalize::execute_normalize_command;
