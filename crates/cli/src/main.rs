// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod cmd_check;
mod cmd_scan;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use fragscan::cli::{Cli, Command};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FRAGSCAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("fragscan={default_level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Scan(args) => cmd_scan::run(&cli, args),
        Command::Check(args) => cmd_check::run(&cli, args),
        Command::Completions(args) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "fragscan", &mut std::io::stdout());
            Ok(())
        }
    }
}
