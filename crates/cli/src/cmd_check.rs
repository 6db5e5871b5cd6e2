// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Check command implementation.

use fragscan::cli::{CheckArgs, Cli};
use fragscan::config;
use fragscan::signatures::SignatureSet;

/// Run the check command.
pub fn run(cli: &Cli, args: &CheckArgs) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = config::resolve(cli.config.as_deref(), &cwd)?;

    let signatures = SignatureSet::load_all(&args.signatures)?;
    let graph = signatures.build_graph(config.scan.bin_count);

    println!(
        "{} signatures in {} files",
        signatures.len(),
        args.signatures.len()
    );
    println!(
        "graph: {} nodes, {} edges, longest path {} bytes",
        graph.node_count(),
        graph.edge_count(),
        graph.longest_path()
    );
    Ok(())
}
