//! Replica CLI Binary
//!
//! Command-line interface for the one-way directory mirroring daemon.

use anyhow::Context;
use clap::Parser;
use replica::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let context = CliContext::new(cli.config.clone()).context("initializing configuration")?;
    context.init_logging(cli).context("initializing logging")?;

    let output = context.execute(&cli.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
