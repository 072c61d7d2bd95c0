//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `sortid`.
#[derive(Debug, Parser)]
#[command(name = "sortid", version, about = "Mint sortable unique identifiers")]
pub struct Cli {
    /// YAML settings file.
    #[arg(long, global = true, env = "SORTID_CONFIG")]
    pub config: Option<PathBuf>,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mint millisecond-resolution identifiers.
    Id(MintArgs),
    /// Mint second-resolution identifiers.
    Short(MintArgs),
    /// Resolve a trace id, minting one when no header value is given.
    Trace {
        /// Value of an inbound `X-Trace-Id` header.
        #[arg(long)]
        header: Option<String>,
        /// Machine id used when minting.
        #[arg(short, long, env = "SORTID_MACHINE_ID")]
        machine: Option<String>,
    },
    /// Split an identifier into window, machine id, sequence and mark.
    Inspect {
        /// Identifier to split.
        id: String,
        /// Machine id the identifier was minted for.
        #[arg(short, long)]
        machine: String,
        /// The identifier is a short (second-resolution) one.
        #[arg(long)]
        short: bool,
    },
}

/// Arguments shared by the minting subcommands.
#[derive(Debug, Args)]
pub struct MintArgs {
    /// Machine id embedded in each identifier.
    #[arg(short, long, env = "SORTID_MACHINE_ID")]
    pub machine: Option<String>,
    /// How many identifiers to mint.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,
    /// Print a JSON document instead of one id per line.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_id_subcommand() {
        let cli = Cli::parse_from(["sortid", "id", "--machine", "0118", "-n", "3"]);
        match cli.command {
            Command::Id(args) => {
                assert_eq!(args.machine.as_deref(), Some("0118"));
                assert_eq!(args.count, 3);
                assert!(!args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_short_subcommand_with_json() {
        let cli = Cli::parse_from(["sortid", "short", "-m", "7", "--json"]);
        assert!(matches!(cli.command, Command::Short(ref args) if args.json && args.count == 1));
    }

    #[test]
    fn parses_inspect_subcommand() {
        let cli = Cli::parse_from(["sortid", "inspect", "19700101000001m0010", "-m", "m", "--short"]);
        assert!(matches!(cli.command, Command::Inspect { short: true, .. }));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["sortid", "trace", "--config", "/tmp/sortid.yaml"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/sortid.yaml")));
    }

    #[test]
    fn inspect_requires_machine() {
        assert!(Cli::try_parse_from(["sortid", "inspect", "123"]).is_err());
    }
}
