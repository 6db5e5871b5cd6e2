// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fragscan library.
//!
//! A fragment trie for locating known byte signatures in binary images,
//! with a sequential longest-match scanner and a parallel scan driver.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod file_reader;
pub mod fragment;
pub mod graph;
pub mod parallel;
pub mod partition;
pub mod report;
pub mod signatures;

#[cfg(test)]
pub mod test_utils;

pub use fragment::{Fragment, FragmentError};
pub use graph::{Graph, GraphError, ScanMatch};
pub use parallel::{ParallelOptions, ParallelScan, ParallelScanner, ScanError};
