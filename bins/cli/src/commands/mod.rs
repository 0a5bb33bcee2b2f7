//! CLI command handlers.

pub mod check_username;
pub mod config;
pub mod info;
pub mod passengers;
mod report;
pub mod run_script;
pub mod validate;

pub use check_username::run_check_username;
pub use config::{run_config_check, run_config_show};
pub use info::run_info;
pub use passengers::run_passengers_list;
pub use run_script::run_script;
pub use validate::run_validate;
