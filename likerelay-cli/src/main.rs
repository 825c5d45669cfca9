// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! LikeRelay CLI - send likes to a player profile from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Send 100 likes
//! likerelay send 12345678
//!
//! # Send a specific quantity
//! likerelay send 12345678 --quantity 250
//!
//! # Check input without sending
//! likerelay validate 12345678 --quantity 2000
//!
//! # History and statistics
//! likerelay history --stats
//!
//! # JSON output
//! likerelay --format json --pretty send 12345678
//!
//! # Show configuration paths
//! likerelay config path
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use likerelay_store::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{config, history, send, validate};

// ============================================================================
// CLI Definition
// ============================================================================

/// LikeRelay CLI - resilient like dispatch.
#[derive(Parser)]
#[command(name = "likerelay")]
#[command(about = "Send likes to a player profile")]
#[command(long_about = r#"
LikeRelay sends likes to a player profile through the first transport
that answers:

  • Relay     (public pass-through relay)
  • Callback  (out-of-band callback channel)
  • Direct    (straight to the endpoint)

The shared credential is read from the config file or LIKERELAY_KEY.

Examples:
  likerelay send 12345678              # 100 likes
  likerelay send 12345678 -n 250       # 250 likes
  likerelay history --stats            # Totals
  likerelay --format json send 12345678
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Send likes to a player.
    #[command(visible_alias = "s")]
    Send(send::SendArgs),

    /// Validate a player id and quantity without sending.
    Validate(validate::ValidateArgs),

    /// Show or clear dispatch history.
    #[command(visible_alias = "h")]
    History(history::HistoryArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Player id or quantity rejected.
    InvalidInput = 2,
}

impl Cli {
    /// Loads the configuration selected by `--config`, with env overrides.
    pub async fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from(path).await?,
            None => Config::load().await?,
        };
        Ok(config.with_env_overrides())
    }

    /// Returns the config file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Whether text output may use ANSI colors.
    pub fn use_colors(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("likerelay=debug,info")
    } else {
        EnvFilter::new("likerelay=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Send(args) => send::run(args, &cli).await,
        Commands::Validate(args) => validate::run(args, &cli),
        Commands::History(args) => history::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from(["likerelay", "send", "12345678", "-n", "250"]).unwrap();
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.player_id, "12345678");
                assert_eq!(args.quantity, 250);
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_send_defaults_to_hundred() {
        let cli = Cli::try_parse_from(["likerelay", "send", "12345678"]).unwrap();
        let Commands::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.quantity, 100);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["likerelay", "history", "--format", "json", "--pretty"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.pretty);
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["likerelay"]).is_err());
    }

    #[test]
    fn test_config_path_override() {
        let cli =
            Cli::try_parse_from(["likerelay", "--config", "/tmp/lr.json", "config", "path"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/lr.json"));
    }
}
