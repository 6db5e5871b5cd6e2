// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scan command implementation.

use std::io::Write;
use std::ops::Range;
use std::sync::Arc;

use anyhow::Context;

use fragscan::cli::{Cli, ScanArgs};
use fragscan::config;
use fragscan::file_reader::FileContent;
use fragscan::graph::{Graph, ScanMatch};
use fragscan::parallel::{ParallelOptions, ParallelScanner, ScanError};
use fragscan::report;
use fragscan::signatures::SignatureSet;

/// Run the scan command.
pub fn run(cli: &Cli, args: &ScanArgs) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = config::resolve(cli.config.as_deref(), &cwd)?;
    let opts = args.parallel_options(&config.scan);

    let signatures = SignatureSet::load_all(&args.signatures)?;
    let graph = signatures.build_graph(config.scan.bin_count);
    tracing::debug!(
        signatures = signatures.len(),
        nodes = graph.node_count(),
        longest = graph.longest_path(),
        "signature graph built"
    );

    let content = FileContent::read(&args.binary)
        .with_context(|| format!("failed to read {}", args.binary.display()))?;
    let ranges = if args.ranges.is_empty() {
        vec![0..content.len()]
    } else {
        args.ranges.clone()
    };

    let entries = if args.sequential {
        let found = scan_sequential(&graph, content.as_ref(), &ranges, &opts)?;
        report::entries(&graph, found, args.dedup)
    } else {
        let scanner = ParallelScanner::new(graph);
        let found: Vec<ScanMatch> = scanner.scan(Arc::new(content), &ranges, &opts)?.collect();
        report::entries(scanner.graph(), found, args.dedup)
    };

    let output = report::format_report(args.output, &entries)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(output.as_bytes())?;
    handle.flush()?;
    Ok(())
}

/// Scan each range in order on the calling thread.
fn scan_sequential(
    graph: &Graph<String>,
    target: &[u8],
    ranges: &[Range<usize>],
    opts: &ParallelOptions,
) -> anyhow::Result<Vec<ScanMatch>> {
    if opts.align == 0 {
        return Err(ScanError::InvalidAlign(0).into());
    }

    let mut found = Vec::new();
    for range in ranges {
        let range = range.start.min(target.len())..range.end.min(target.len());
        let Some(bytes) = target.get(range.clone()) else {
            continue;
        };
        found.extend(graph.matches(bytes, range.start, opts.align)?);
    }
    Ok(found)
}
