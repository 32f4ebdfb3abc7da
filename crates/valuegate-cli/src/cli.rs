//! CLI argument definitions for valuegate.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `valuate` | Look up a vehicle valuation, fetching and storing it if needed |
//! | `batch` | Run many lookups through one long-lived service |
//! | `show` | Print a stored valuation |
//! | `logs` | List provider audit logs |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Answer from built-in provider fixtures |
//! | `--db-path` | `$VALUEGATE_HOME/data/valuegate.duckdb` | Warehouse file |
//!
//! # Examples
//!
//! ```bash
//! valuegate valuate ABC123 --mileage 50000
//! valuegate --mock --pretty valuate ab12cde --mileage 12000
//! valuegate logs --provider SuperCar --limit 20
//! printf 'AB12CDE 42000\nXY99ZZZ 8000\n' | valuegate batch
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Vehicle valuation lookups with primary/fallback provider failover.
#[derive(Debug, Parser)]
#[command(
    name = "valuegate",
    author,
    version,
    about = "Vehicle valuation lookups with provider failover"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve provider calls from built-in fixtures instead of the network.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Override the warehouse database file.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Return the stored valuation for a VRM, or fetch and store a new one.
    ///
    /// # Examples
    ///
    ///   valuegate valuate ABC123 --mileage 50000
    Valuate(ValuateArgs),

    /// Valuate every `VRM MILEAGE` line from stdin or a file.
    ///
    /// All lines share one service, so primary failures accumulate in the
    /// gate and later lines fail over to the fallback provider.
    ///
    /// # Examples
    ///
    ///   valuegate batch --input vehicles.txt
    Batch(BatchArgs),

    /// Print the stored valuation for a VRM.
    Show(ShowArgs),

    /// List provider audit logs, newest first.
    ///
    /// # Examples
    ///
    ///   valuegate logs --vrm ABC123
    ///   valuegate logs --provider PremiumCar --limit 5
    Logs(LogsArgs),
}

#[derive(Debug, Args)]
pub struct ValuateArgs {
    /// Vehicle registration mark, up to 7 characters.
    pub vrm: String,

    /// Current odometer reading; must be positive.
    #[arg(long)]
    pub mileage: u32,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Read lines from this file instead of stdin.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub vrm: String,
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Only logs for this VRM.
    #[arg(long)]
    pub vrm: Option<String>,

    /// Only logs for this provider (SuperCar, PremiumCar).
    #[arg(long)]
    pub provider: Option<String>,

    /// Maximum number of entries (default: 50).
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valuate_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "valuegate",
            "valuate",
            "ABC123",
            "--mileage",
            "50000",
            "--mock",
            "--pretty",
        ])
        .expect("valid args");

        assert!(cli.mock);
        assert!(cli.pretty);
        match cli.command {
            Command::Valuate(args) => {
                assert_eq!(args.vrm, "ABC123");
                assert_eq!(args.mileage, 50_000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn valuate_requires_mileage() {
        assert!(Cli::try_parse_from(["valuegate", "valuate", "ABC123"]).is_err());
        assert!(
            Cli::try_parse_from(["valuegate", "valuate", "ABC123", "--mileage", "-5"]).is_err()
        );
    }

    #[test]
    fn parses_batch_input_file() {
        let cli = Cli::try_parse_from(["valuegate", "batch", "--input", "vehicles.txt"])
            .expect("valid args");
        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.input, Some(PathBuf::from("vehicles.txt")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn logs_defaults_limit() {
        let cli = Cli::try_parse_from(["valuegate", "logs", "--provider", "SuperCar"])
            .expect("valid args");
        match cli.command {
            Command::Logs(args) => {
                assert_eq!(args.provider.as_deref(), Some("SuperCar"));
                assert_eq!(args.vrm, None);
                assert_eq!(args.limit, 50);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
