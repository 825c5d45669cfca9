//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use likerelay_store::{default_config_dir, Config, CREDENTIAL_ENV};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show effective configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Init { force } => init_config(*force, cli).await?,
        ConfigAction::Reset => reset_config(cli).await?,
    }
    Ok(ExitCode::Success)
}

async fn show_config(cli: &Cli) -> Result<()> {
    let config = cli.load_config().await?;

    match cli.format {
        OutputFormat::Text => {
            let t = &config.timeouts;
            println!("LikeRelay Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Endpoint:       {}", config.endpoint_url);
            println!("Relay:          {} ({:?})", config.relay_url, config.relay_envelope);
            println!(
                "Metadata:       {}",
                config.metadata_url.as_deref().unwrap_or("−")
            );
            println!("Probe metadata: {}", config.probe_metadata);
            println!(
                "Credential:     {}",
                if config.credential.is_some() { "set" } else { "not set" }
            );
            println!();
            println!(
                "Timeouts: relay {}s, callback {}s, direct {}s, metadata {}s (+{}ms grace)",
                t.proxied_secs, t.callback_secs, t.direct_secs, t.metadata_secs, t.metadata_grace_ms
            );
            println!(
                "History:  {} (max {})",
                if config.history.persist {
                    config.history_path().display().to_string()
                } else {
                    "memory only".to_string()
                },
                config.history.limit
            );
        }
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&config)?;
            if config.credential.is_some() {
                value["credential"] = serde_json::json!("***");
            }
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&value)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_path = cli.config_path();
    let history_path = Config::default().history_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:   {}", config_dir.display());
            println!("Config file:  {}", config_path.display());
            println!("History file: {}", history_path.display());
            println!("Credential:   ${CREDENTIAL_ENV}");
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_path.display().to_string(),
                "history_file": history_path.display().to_string(),
                "credential_env": CREDENTIAL_ENV,
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if tokio::fs::try_exists(&path).await? && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default().save_to(&path).await?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if tokio::fs::try_exists(&path).await? {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Config reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
