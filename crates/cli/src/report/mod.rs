// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scan report formatting.
//!
//! Matches are resolved to signature names, sorted by `(end, size)` and
//! rendered as text or JSON.

mod json;
mod text;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::graph::{Graph, ScanMatch};

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// One reported match with its signature names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub start: usize,
    pub end: usize,
    pub size: usize,
    pub names: Vec<String>,
}

/// Resolve matches against `graph` and sort them by `(end, size)`.
///
/// With `dedup`, exact duplicates (same terminus and end) are dropped.
/// These arise where parallel slices overlap.
pub fn entries(
    graph: &Graph<String>,
    matches: impl IntoIterator<Item = ScanMatch>,
    dedup: bool,
) -> Vec<ReportEntry> {
    let mut matches: Vec<ScanMatch> = matches.into_iter().collect();
    matches.sort_by_key(|m| (m.end, m.size, m.terminus));
    if dedup {
        matches.dedup();
    }

    matches
        .into_iter()
        .map(|m| ReportEntry {
            start: m.start(),
            end: m.end,
            size: m.size,
            names: graph.payloads(m.terminus).to_vec(),
        })
        .collect()
}

/// Trait for formatting scan results into various output formats.
pub trait ReportFormatter {
    /// Format report entries into the target format.
    fn format(&self, entries: &[ReportEntry]) -> anyhow::Result<String>;
}

/// Format a report based on output format, returning the output string.
pub fn format_report(format: OutputFormat, entries: &[ReportEntry]) -> anyhow::Result<String> {
    let formatter: Box<dyn ReportFormatter> = match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    };
    formatter.format(entries)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
