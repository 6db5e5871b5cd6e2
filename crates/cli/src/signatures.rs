// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Signature sets loaded from TOML.
//!
//! ```toml
//! [[signature]]
//! name = "memcpy"
//! pattern = "55 48 89 E5 ?? ?? 48 8B"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::fragment::{Fragment, FragmentError};
use crate::graph::Graph;

/// Errors produced while loading signatures.
#[derive(Debug, Error)]
pub enum SignatureError {
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

    #[error("invalid pattern for signature `{name}`: {source}")]
    Pattern {
        name: String,
        source: FragmentError,
    },

    #[error("duplicate signature name `{0}`")]
    DuplicateName(String),
}

/// On-disk signature file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SignatureFile {
    #[serde(rename = "signature")]
    signatures: Vec<SignatureEntry>,
}

#[derive(Debug, Deserialize)]
struct SignatureEntry {
    name: String,
    pattern: String,
}

/// A named byte pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub fragment: Fragment,
}

/// An ordered collection of uniquely named signatures.
#[derive(Debug, Default, Clone)]
pub struct SignatureSet {
    signatures: Vec<Signature>,
    names: HashSet<String>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a signature file.
    pub fn load(path: &Path) -> Result<Self, SignatureError> {
        let content = std::fs::read_to_string(path).map_err(|source| SignatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load and merge several signature files.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self, SignatureError> {
        let mut set = Self::new();
        for path in paths {
            set.extend(Self::load(path.as_ref())?)?;
        }
        Ok(set)
    }

    /// Parse signature file content. `path` is only used in error messages.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, SignatureError> {
        let file: SignatureFile = toml::from_str(content).map_err(|source| SignatureError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut set = Self::new();
        for entry in file.signatures {
            let fragment = Fragment::parse(&entry.pattern).map_err(|source| SignatureError::Pattern {
                name: entry.name.clone(),
                source,
            })?;
            set.push(Signature {
                name: entry.name,
                fragment,
            })?;
        }
        if set.is_empty() {
            tracing::warn!("no signatures in {}", path.display());
        }
        Ok(set)
    }

    /// Add one signature. Names must be unique across the set.
    pub fn push(&mut self, signature: Signature) -> Result<(), SignatureError> {
        if !self.names.insert(signature.name.clone()) {
            return Err(SignatureError::DuplicateName(signature.name));
        }
        self.signatures.push(signature);
        Ok(())
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: SignatureSet) -> Result<(), SignatureError> {
        for signature in other.signatures {
            self.push(signature)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter()
    }

    /// Insert every signature into a fresh, finalized graph keyed by name.
    pub fn build_graph(&self, bin_count: usize) -> Graph<String> {
        let mut graph = Graph::with_bin_count(bin_count);
        for signature in &self.signatures {
            if !graph.insert(signature.fragment.clone(), signature.name.clone()) {
                tracing::debug!("signature `{}` ends at an existing node", signature.name);
            }
        }
        graph.finalize();
        graph
    }
}

#[cfg(test)]
#[path = "signatures_tests.rs"]
mod tests;
