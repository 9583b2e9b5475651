//! CLI command implementations

pub mod check;
pub mod show;

pub use check::check_command;
pub use show::show_command;
