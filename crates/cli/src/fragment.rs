// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Byte fragments with wildcard positions.
//!
//! A fragment is the label on a trie edge: a byte template plus a
//! per-position wildcard flag. Wildcard positions match any target byte.
//! The template byte under a wildcard is always 0 so that two fragments
//! compare equal exactly when their literal bytes and wildcard layout agree.

use std::fmt;

use thiserror::Error;

/// Errors produced while building a fragment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FragmentError {
    #[error("invalid pattern byte: {0:?} (expected two hex digits or ??)")]
    InvalidByte(String),

    #[error("template has {template} bytes but {wildcards} wildcard flags")]
    MismatchedLengths { template: usize, wildcards: usize },

    #[error("pattern is empty")]
    Empty,
}

/// A byte pattern with optional wildcard positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fragment {
    template: Vec<u8>,
    wildcards: Vec<bool>,
}

impl Fragment {
    /// Create a fragment from a template and matching wildcard flags.
    pub fn new(mut template: Vec<u8>, wildcards: Vec<bool>) -> Result<Self, FragmentError> {
        if template.len() != wildcards.len() {
            return Err(FragmentError::MismatchedLengths {
                template: template.len(),
                wildcards: wildcards.len(),
            });
        }
        for (byte, &wild) in template.iter_mut().zip(&wildcards) {
            if wild {
                *byte = 0;
            }
        }
        Ok(Self { template, wildcards })
    }

    /// Create a fragment with no wildcards.
    pub fn literal(bytes: &[u8]) -> Self {
        Self {
            template: bytes.to_vec(),
            wildcards: vec![false; bytes.len()],
        }
    }

    /// Parse a fragment from space-separated hex bytes.
    ///
    /// Format: `"55 48 89 E5 ?? ?? 48 8B"`, where `??` (or `**`) is a wildcard.
    pub fn parse(s: &str) -> Result<Self, FragmentError> {
        let mut template = Vec::new();
        let mut wildcards = Vec::new();

        for part in s.split_whitespace() {
            if part == "??" || part == "**" {
                template.push(0);
                wildcards.push(true);
                continue;
            }
            if part.len() != 2 {
                return Err(FragmentError::InvalidByte(part.to_string()));
            }
            let value = u8::from_str_radix(part, 16)
                .map_err(|_| FragmentError::InvalidByte(part.to_string()))?;
            template.push(value);
            wildcards.push(false);
        }

        if template.is_empty() {
            return Err(FragmentError::Empty);
        }
        Ok(Self { template, wildcards })
    }

    pub fn len(&self) -> usize {
        self.template.len()
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    /// Template bytes; wildcard positions read as 0.
    pub fn template(&self) -> &[u8] {
        &self.template
    }

    /// Check whether `data` matches this fragment.
    ///
    /// Lengths must agree; wildcard positions accept any byte.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.len() == self.template.len()
            && self
                .template
                .iter()
                .zip(&self.wildcards)
                .zip(data)
                .all(|((&t, &wild), &b)| wild || t == b)
    }

    /// Length of the shared prefix with `other`.
    ///
    /// A wildcard only agrees with another wildcard, never with a literal.
    pub fn longest_common_prefix(&self, other: &Fragment) -> usize {
        self.template
            .iter()
            .zip(&self.wildcards)
            .zip(other.template.iter().zip(&other.wildcards))
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Split at `at`: `self` keeps `[..at]` and the suffix `[at..]` is returned.
    pub fn split_at(&mut self, at: usize) -> Fragment {
        let at = at.min(self.len());
        Fragment {
            template: self.template.split_off(at),
            wildcards: self.wildcards.split_off(at),
        }
    }

    /// Drop the first `n` positions in place.
    pub fn drop_before(&mut self, n: usize) {
        let n = n.min(self.len());
        self.template.drain(..n);
        self.wildcards.drain(..n);
    }

    pub fn is_wildcard_at(&self, index: usize) -> bool {
        self.wildcards.get(index).copied().unwrap_or(false)
    }

    /// The first byte, if it is a literal.
    pub fn leading_literal_byte(&self) -> Option<u8> {
        match self.wildcards.first() {
            Some(false) => self.template.first().copied(),
            _ => None,
        }
    }

    /// Fraction of positions that are wildcards, in `[0, 1]`.
    pub fn wildcard_ratio(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let wild = self.wildcards.iter().filter(|&&w| w).count();
        wild as f64 / self.len() as f64
    }

    /// Render as hex with `??` for wildcards.
    pub fn to_hex_string(&self) -> String {
        self.template
            .iter()
            .zip(&self.wildcards)
            .map(|(&b, &wild)| if wild { "??".to_string() } else { format!("{:02X}", b) })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

#[cfg(test)]
#[path = "fragment_tests.rs"]
mod tests;
