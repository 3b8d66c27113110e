//! CLI module
//!
//! Command-line interface the host uses to drive the connector.
//!
//! # Commands
//!
//! - `spec` - Print the connection specification
//! - `check` - Test the credentials by running discovery
//! - `discover` - Print the catalog with sync-mode overrides applied
//! - `read` - Run the tap and relay records and state

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
