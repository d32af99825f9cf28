#![warn(missing_docs)]

//! Entry point for the `layout-tester` binary.

mod cli;
mod commands;
mod error;
mod harness;
mod report;

use std::{io, process};

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    match run() {
        Ok(out) => print!("{out}"),
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<String> {
    let Cli { log, command } = Cli::parse();
    let env_filter = log.env_filter();
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .try_init()
        .ok();

    match command {
        Commands::Sections(args) => commands::sections(&args),
        Commands::Apply(args) => commands::apply(&args),
        Commands::Reconcile(args) => commands::reconcile(&args),
        Commands::Reset(args) => commands::reset(&args),
        Commands::Surface(args) => commands::surface(&args),
    }
}
