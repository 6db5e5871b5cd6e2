// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scan configuration loaded from `fragscan.toml`.
//!
//! ```toml
//! version = 1
//!
//! [scan]
//! align = 2
//! delta = 10
//! workers = 8
//! overlap = 32
//! bin_count = 256
//! ```

pub mod defaults;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::parallel::ParallelOptions;

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Config format version; must be 1.
    pub version: u32,

    /// Scan settings.
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: defaults::VERSION,
            scan: ScanConfig::default(),
        }
    }
}

/// `[scan]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Match start alignment in bytes.
    pub align: usize,

    /// Slice size as a multiple of the longest signature.
    pub delta: usize,

    /// Worker threads (unset = available parallelism).
    pub workers: Option<usize>,

    /// Slice overlap in bytes (unset = half the longest signature).
    pub overlap: Option<usize>,

    /// First-byte bins per trie node.
    pub bin_count: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            align: defaults::ALIGN,
            delta: defaults::DELTA,
            workers: None,
            overlap: None,
            bin_count: defaults::BIN_COUNT,
        }
    }
}

impl ScanConfig {
    /// Options for [`crate::parallel::ParallelScanner`].
    pub fn parallel_options(&self) -> ParallelOptions {
        ParallelOptions {
            align: self.align,
            workers: self.workers,
            overlap: self.overlap,
            delta: self.delta,
        }
    }
}

const KNOWN_KEYS: &[&str] = &["version", "scan"];
const KNOWN_SCAN_KEYS: &[&str] = &["align", "delta", "workers", "overlap", "bin_count"];

/// Parse config content. `path` is only used in error messages.
pub fn parse(content: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config, path)?;
    Ok(config)
}

/// Keys present in `content` that this version does not understand.
pub fn unknown_keys(content: &str) -> Vec<String> {
    let Ok(table) = toml::from_str::<toml::Table>(content) else {
        return Vec::new();
    };

    let mut unknown: Vec<String> = table
        .keys()
        .filter(|k| !KNOWN_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();

    if let Some(toml::Value::Table(scan)) = table.get("scan") {
        unknown.extend(
            scan.keys()
                .filter(|k| !KNOWN_SCAN_KEYS.contains(&k.as_str()))
                .map(|k| format!("scan.{}", k)),
        );
    }
    unknown
}

/// Load a config file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = read(path)?;
    parse(&content, path)
}

/// Load a config file, warning about unrecognized keys instead of failing.
pub fn load_with_warnings(path: &Path) -> Result<Config, ConfigError> {
    let content = read(path)?;
    for key in unknown_keys(&content) {
        eprintln!("warning: unknown config key `{}` in {}", key, path.display());
    }
    parse(&content, path)
}

/// Resolve the config for a run: an explicit path wins, otherwise
/// `fragscan.toml` is discovered from `cwd`, otherwise defaults apply.
pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Config, ConfigError> {
    match explicit.map(Path::to_path_buf).or_else(|| crate::discovery::find_config(cwd)) {
        Some(path) => load_with_warnings(&path),
        None => Ok(Config::default()),
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn validate(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    if config.version != defaults::VERSION {
        return Err(invalid(format!(
            "unsupported version {} (expected {})",
            config.version,
            defaults::VERSION
        )));
    }
    if config.scan.align == 0 {
        return Err(invalid("scan.align must be at least 1".to_string()));
    }
    if config.scan.delta == 0 {
        return Err(invalid("scan.delta must be at least 1".to_string()));
    }
    if config.scan.bin_count == 0 {
        return Err(invalid("scan.bin_count must be at least 1".to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
