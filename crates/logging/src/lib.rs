#![warn(missing_docs)]

//! Shared logging helpers and CLI argument definitions for the layout workspace.
//!
//! Binaries flatten [`LogArgs`] into their CLI and install a
//! `tracing-subscriber` registry with [`LogArgs::env_filter`].

use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "layout_engine=trace,layout_prefs=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter directive for these flags.
    ///
    /// An explicit `--log-filter` is used verbatim. Otherwise the first of
    /// `--trace`, `--debug` and `--log-level` scopes a level to our crates.
    /// With no flags, `RUST_LOG` applies, and failing that our crates log at
    /// `info`.
    pub fn spec(&self) -> String {
        if let Some(filter) = &self.log_filter {
            return filter.clone();
        }
        let level = if self.trace {
            Some("trace")
        } else if self.debug {
            Some("debug")
        } else {
            self.log_level.as_deref()
        };
        match level {
            Some(l) => level_spec_for(l),
            None => env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info")),
        }
    }

    /// `EnvFilter` for [`Self::spec`]. A directive that does not parse falls
    /// back to crate-scoped `info` rather than silently dropping output.
    pub fn env_filter(&self) -> EnvFilter {
        let spec = self.spec();
        EnvFilter::try_new(&spec).unwrap_or_else(|e| {
            eprintln!("invalid log filter {spec:?}: {e}; using info");
            EnvFilter::new(level_spec_for("info"))
        })
    }
}

/// Crate targets whose logs the level flags control.
pub const OUR_CRATES: &[&str] = &[
    "layout_host",
    "layout_prefs",
    "layout_engine",
    "layout_tester",
    "logging",
];

/// `target=level` for every crate in [`OUR_CRATES`], comma-joined.
pub fn level_spec_for(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    OUR_CRATES
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
