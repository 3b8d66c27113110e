//! CLI commands and argument parsing

use crate::source::TAP_CMD;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marketo source connector backed by tap-marketo
#[derive(Parser, Debug)]
#[command(name = "source-marketo-singer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Tap command to invoke
    #[arg(long, global = true, default_value = TAP_CMD)]
    pub tap_command: String,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show connector specification
    Spec,

    /// Test connection to the Marketo API
    Check {
        /// Configuration file (JSON)
        #[arg(long)]
        config: PathBuf,
    },

    /// Discover available streams
    Discover {
        /// Configuration file (JSON)
        #[arg(long)]
        config: PathBuf,
    },

    /// Read data from the selected streams
    Read {
        /// Configuration file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Configured catalog file (JSON)
        #[arg(long)]
        catalog: PathBuf,

        /// State file (JSON)
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read() {
        let cli = Cli::parse_from([
            "source-marketo-singer",
            "read",
            "--config",
            "config.json",
            "--catalog",
            "catalog.json",
        ]);
        assert_eq!(cli.tap_command, "tap-marketo");
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Read {
                config,
                catalog,
                state,
            } => {
                assert_eq!(config, PathBuf::from("config.json"));
                assert_eq!(catalog, PathBuf::from("catalog.json"));
                assert!(state.is_none());
            }
            other => panic!("Expected read, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from([
            "source-marketo-singer",
            "check",
            "--config",
            "config.json",
            "--tap-command",
            "/opt/tap-marketo",
            "-f",
            "pretty",
        ]);
        assert_eq!(cli.tap_command, "/opt/tap-marketo");
        assert_eq!(cli.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_check_requires_config() {
        assert!(Cli::try_parse_from(["source-marketo-singer", "check"]).is_err());
    }
}
