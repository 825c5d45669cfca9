//! Validate command - check input without any network activity.

use anyhow::Result;
use clap::Args;
use likerelay_core::{validate_player_id, validate_quantity, LikeRequest};
use serde::Serialize;

use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Numeric player id.
    pub player_id: String,

    /// Number of likes (1-1000).
    #[arg(long, short = 'n', default_value_t = 100, allow_hyphen_values = true)]
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationOutput {
    valid: bool,
    player_id_valid: bool,
    quantity_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn check(args: &ValidateArgs) -> ValidationOutput {
    let player_id = args.player_id.trim();
    let error = LikeRequest::new(player_id, args.quantity)
        .err()
        .map(|e| e.to_string());

    ValidationOutput {
        valid: error.is_none(),
        player_id_valid: validate_player_id(player_id),
        quantity_valid: validate_quantity(args.quantity),
        error,
    }
}

/// Runs the validate command.
pub fn run(args: &ValidateArgs, cli: &Cli) -> Result<ExitCode> {
    let output = check(args);

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                match &output.error {
                    None => println!("OK: {} x{}", args.player_id.trim(), args.quantity),
                    Some(e) => println!("{e}"),
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(if output.valid {
        ExitCode::Success
    } else {
        ExitCode::InvalidInput
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(player_id: &str, quantity: i64) -> ValidateArgs {
        ValidateArgs {
            player_id: player_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_valid_input() {
        let output = check(&args("12345678", 100));
        assert!(output.valid);
        assert!(output.error.is_none());
    }

    #[test]
    fn test_reports_each_field() {
        let output = check(&args("12ab", 100));
        assert!(!output.valid);
        assert!(!output.player_id_valid);
        assert!(output.quantity_valid);

        let output = check(&args("12345678", 1001));
        assert!(output.player_id_valid);
        assert!(!output.quantity_valid);
        assert!(output.error.unwrap().contains("1001"));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert!(check(&args(" 12345678 ", 1)).valid);
    }
}
