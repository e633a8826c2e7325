//! CLI module for endurecer
//!
//! Command handlers and output utilities.

mod commands;
mod logging;

pub use commands::{run_command, Arch, Cli, Command};
pub use logging::{log, LogLevel};
