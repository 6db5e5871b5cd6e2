// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::ops::Range;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::config::ScanConfig;
use crate::parallel::ParallelOptions;

/// Find known code signatures in binary images
#[derive(Parser)]
#[command(name = "fragscan")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "FRAGSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan a binary for signatures
    Scan(ScanArgs),
    /// Validate signature files
    Check(CheckArgs),
    /// Print shell completions
    Completions(CompletionsArgs),
}

#[derive(clap::Args)]
pub struct ScanArgs {
    /// Binary image to scan
    #[arg(value_name = "BINARY")]
    pub binary: PathBuf,

    /// Signature files (TOML)
    #[arg(short, long = "signatures", value_name = "SIGS", required = true, num_args = 1..)]
    pub signatures: Vec<PathBuf>,

    /// Only scan this byte range (repeatable)
    #[arg(long = "range", value_name = "START..END", value_parser = parse_range)]
    pub ranges: Vec<Range<usize>>,

    /// Match start alignment in bytes
    #[arg(long, value_name = "N", value_parser = parse_number)]
    pub align: Option<usize>,

    /// Worker threads (0 = available parallelism)
    #[arg(long, value_name = "N", value_parser = parse_number)]
    pub workers: Option<usize>,

    /// Bytes shared by neighbouring slices
    #[arg(long, value_name = "N", value_parser = parse_number)]
    pub overlap: Option<usize>,

    /// Slice size as a multiple of the longest signature
    #[arg(long, value_name = "N", value_parser = parse_number)]
    pub delta: Option<usize>,

    /// Scan on the calling thread only
    #[arg(long)]
    pub sequential: bool,

    /// Drop duplicate matches from overlapping slices
    #[arg(long)]
    pub dedup: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,
}

impl ScanArgs {
    /// Scan options from config, overridden by any flags given.
    pub fn parallel_options(&self, config: &ScanConfig) -> ParallelOptions {
        let mut opts = config.parallel_options();
        if let Some(align) = self.align {
            opts.align = align;
        }
        if let Some(delta) = self.delta {
            opts.delta = delta;
        }
        if self.workers.is_some() {
            opts.workers = self.workers;
        }
        if self.overlap.is_some() {
            opts.overlap = self.overlap;
        }
        opts
    }
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Signature files (TOML)
    #[arg(short, long = "signatures", value_name = "SIGS", required = true, num_args = 1..)]
    pub signatures: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_number(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number `{}`: {}", s, e))
}

/// Parse a half-open `START..END` byte range.
pub fn parse_range(s: &str) -> Result<Range<usize>, String> {
    let Some((start, end)) = s.split_once("..") else {
        return Err(format!("invalid range `{}`: expected START..END", s));
    };
    let start = parse_number(start)?;
    let end = parse_number(end)?;
    if end < start {
        return Err(format!("invalid range `{}`: end is before start", s));
    }
    Ok(start..end)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
