//! History command - list, summarize or clear past dispatches.

use anyhow::Result;
use clap::Args;
use likerelay_store::JsonFileHistory;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Show aggregate statistics instead of records.
    #[arg(long)]
    pub stats: bool,

    /// Maximum number of records to show.
    #[arg(long, short = 'l', default_value_t = 20)]
    pub limit: usize,

    /// Delete all records.
    #[arg(long, conflicts_with = "stats")]
    pub clear: bool,
}

/// Runs the history command.
pub async fn run(args: &HistoryArgs, cli: &Cli) -> Result<ExitCode> {
    let config = cli.load_config().await?;
    let history = JsonFileHistory::new(config.history_path(), config.history.limit);

    if args.clear {
        history.clear().await?;
        info!(path = %history.path().display(), "History cleared");
        if !cli.quiet {
            println!("History cleared");
        }
        return Ok(ExitCode::Success);
    }

    match (cli.format, args.stats) {
        (OutputFormat::Text, true) => {
            let formatter = TextFormatter::new(cli.use_colors());
            println!("{}", formatter.format_stats(&history.stats().await));
        }
        (OutputFormat::Text, false) => {
            let formatter = TextFormatter::new(cli.use_colors());
            let records = history.list().await;
            println!("{}", formatter.format_history(&records[..records.len().min(args.limit)]));
        }
        (OutputFormat::Json, true) => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&history.stats().await)?);
        }
        (OutputFormat::Json, false) => {
            let formatter = JsonFormatter::new(cli.pretty);
            let mut records = history.list().await;
            records.truncate(args.limit);
            println!("{}", formatter.format(&records)?);
        }
    }

    Ok(ExitCode::Success)
}
