//! CLI tool for exploring consistent-hash routing.
//!
//! Provides commands for:
//! - Simulating request streams and reporting load distribution
//! - Inspecting ring state
//! - Routing individual keys

pub mod commands;
pub mod config;
pub mod logging;
pub mod simulate;
pub mod visualize;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
