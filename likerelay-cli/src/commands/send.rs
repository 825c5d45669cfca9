//! Send command - dispatch likes to a player.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use likerelay_core::{HistorySink, LikeRequest};
use likerelay_fetch::DispatchContext;
use likerelay_store::{Config, JsonFileHistory, MemoryHistory};
use likerelay_transports::DispatchPlan;
use tracing::{debug, info, warn};

use crate::output::{JsonFormatter, SendOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the send command.
#[derive(Args)]
pub struct SendArgs {
    /// Numeric player id.
    pub player_id: String,

    /// Number of likes to send (1-1000).
    #[arg(long, short = 'n', default_value_t = 100, allow_hyphen_values = true)]
    pub quantity: i64,

    /// Never spend an extra like to resolve a placeholder nickname.
    #[arg(long)]
    pub no_probe: bool,

    /// Keep history in memory only for this run.
    #[arg(long)]
    pub no_history: bool,

    /// Show every transport attempt.
    #[arg(long)]
    pub attempts: bool,
}

/// Runs the send command.
pub async fn run(args: &SendArgs, cli: &Cli) -> Result<ExitCode> {
    let request = match LikeRequest::new(args.player_id.trim(), args.quantity) {
        Ok(request) => request,
        Err(e) => {
            if !cli.quiet {
                eprintln!("{e}");
            }
            return Ok(ExitCode::InvalidInput);
        }
    };

    let config = cli.load_config().await?;
    if config.credential.is_none() {
        warn!("No credential configured; set LIKERELAY_KEY or add it to the config file");
    }

    let history = history_sink(&config, args.no_history);
    let ctx = Arc::new(DispatchContext::with_settings(config.to_settings()));
    let dispatcher = DispatchPlan::new()
        .probe_metadata(config.probe_metadata && !args.no_probe)
        .build(ctx, history);

    info!(player_id = %request.player_id(), quantity = request.quantity(), "Sending likes");
    let report = dispatcher.dispatch_with_report(&request).await;

    // The process exits right after printing; let the history write land first.
    if let Err(e) = report.persistence.await {
        debug!(error = %e, "History task did not complete");
    }

    let output = SendOutput::from_report(&request, &report.result, &report.strategy_id, &report.attempts);

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                let formatter = TextFormatter::new(cli.use_colors());
                println!("{}", formatter.format_send(&output, args.attempts));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(ExitCode::Success)
}

fn history_sink(config: &Config, ephemeral: bool) -> Arc<dyn HistorySink> {
    if ephemeral || !config.history.persist {
        Arc::new(MemoryHistory::with_capacity(config.history.limit))
    } else {
        Arc::new(JsonFileHistory::new(config.history_path(), config.history.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_sink_selection() {
        let mut config = Config::default();
        assert_eq!(history_sink(&config, false).name(), "json-file");
        assert_eq!(history_sink(&config, true).name(), "memory");

        config.history.persist = false;
        assert_eq!(history_sink(&config, false).name(), "memory");
    }
}
