//! Command-line interface definitions for layout-tester.

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `layout-tester` binary.
#[derive(Parser, Debug)]
#[command(
    name = "layout-tester",
    about = "Drive the accordion layout engine against a fixture tree",
    version
)]
pub struct Cli {
    /// Logging controls shared across our binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Which operation to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level tester commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print discovered sections with toggle/body presence and open state.
    Sections(HostArgs),
    /// Run the layout applier once and print the resulting order.
    Apply(ApplyArgs),
    /// Run the applier and one reconciliation pass, then print outcomes.
    Reconcile(ReconcileArgs),
    /// Clear the stored preferences.
    Reset(StoreArgs),
    /// Open the reordering surface, apply scripted edits, and save.
    Surface(SurfaceArgs),
}

/// Where preferences live and which config to use.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Directory holding preference records; in-memory when omitted.
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Engine configuration file (RON).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// A fixture tree plus store selection.
#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Host fixture tree (RON).
    #[arg(long, value_name = "PATH")]
    pub tree: PathBuf,

    /// Store and config selection.
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Arguments for the `apply` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Host and store.
    #[command(flatten)]
    pub host: HostArgs,

    /// Also run the scheduled reconciliation passes and print their outcomes.
    #[arg(long)]
    pub passes: bool,
}

/// Arguments for the `reconcile` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ReconcileArgs {
    /// Host and store.
    #[command(flatten)]
    pub host: HostArgs,

    /// Delay between applying and reconciling.
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        default_value = "0s",
        value_name = "DURATION"
    )]
    pub settle: Duration,
}

/// Arguments for the `surface` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SurfaceArgs {
    /// Host and store.
    #[command(flatten)]
    pub host: HostArgs,

    /// Move a row, e.g. `--move "Notes:0"`. Repeatable; applied in order.
    #[arg(long = "move", value_name = "TITLE:INDEX")]
    pub moves: Vec<MoveSpec>,

    /// Tick the hide checkbox for a row. Repeatable.
    #[arg(long, value_name = "TITLE")]
    pub hide: Vec<String>,

    /// Tick the open checkbox for a row. Repeatable.
    #[arg(long, value_name = "TITLE")]
    pub open: Vec<String>,

    /// Clear every hide checkbox before per-row edits.
    #[arg(long)]
    pub show_all: bool,

    /// Clear every open checkbox before per-row edits.
    #[arg(long)]
    pub open_none: bool,
}

/// A scripted row move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSpec {
    /// Row title.
    pub title: String,
    /// Destination index.
    pub index: usize,
}

impl FromStr for MoveSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (title, index) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected TITLE:INDEX, got '{s}'"))?;
        let index = index
            .trim()
            .parse()
            .map_err(|e| format!("bad index in '{s}': {e}"))?;
        let title = title.trim();
        if title.is_empty() {
            return Err(format!("empty title in '{s}'"));
        }
        Ok(Self {
            title: title.to_string(),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn move_spec_splits_on_last_colon() {
        assert_eq!(
            "Notes: internal:2".parse::<MoveSpec>().unwrap(),
            MoveSpec {
                title: "Notes: internal".into(),
                index: 2
            }
        );
        assert!("Notes".parse::<MoveSpec>().is_err());
        assert!(":1".parse::<MoveSpec>().is_err());
        assert!("A:x".parse::<MoveSpec>().is_err());
    }

    #[test]
    fn surface_flags_parse() {
        let cli = Cli::try_parse_from([
            "layout-tester",
            "--debug",
            "surface",
            "--tree",
            "t.ron",
            "--move",
            "C:0",
            "--hide",
            "B",
            "--open-none",
        ])
        .unwrap();
        let Commands::Surface(args) = cli.command else {
            panic!("expected surface");
        };
        assert!(cli.log.debug);
        assert_eq!(args.moves.len(), 1);
        assert_eq!(args.hide, vec!["B"]);
        assert!(args.open_none);
        assert!(!args.show_all);
    }
}
