// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized default values for configuration.
//!
//! All default values are documented here for easy reference.
//! Config structs and scan options delegate to these constants.

/// Supported config file version.
pub const VERSION: u32 = 1;

/// Match start alignment in bytes (2 suits Thumb and most RISC encodings).
pub const ALIGN: usize = 2;

/// Slice size as a multiple of the longest signature.
pub const DELTA: usize = 10;

/// First-byte bins per trie node (one per byte value).
pub const BIN_COUNT: usize = crate::graph::DEFAULT_BIN_COUNT;

/// Config file name searched for by discovery.
pub const CONFIG_FILE: &str = "fragscan.toml";
