// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Target binary reading with size-based strategy.
//!
//! - below [`MMAP_THRESHOLD`]: read into an owned buffer
//! - otherwise: memory-mapped
// Allow unsafe_code for memory-mapped I/O (required by memmap2).
#![allow(unsafe_code)]

use std::fs::{self, File};
use std::io;
use std::path::Path;

use memmap2::Mmap;

/// Files at least this large are memory-mapped (64 KiB).
pub const MMAP_THRESHOLD: u64 = 64 * 1024;

/// Content of a target binary, either owned or memory-mapped.
#[derive(Debug)]
pub enum FileContent {
    /// Small file read into memory.
    Owned(Vec<u8>),
    /// Large file memory-mapped.
    Mapped(Mmap),
}

impl FileContent {
    /// Read file using appropriate strategy based on size.
    pub fn read(path: &Path) -> io::Result<Self> {
        let size = fs::metadata(path)?.len();

        if size < MMAP_THRESHOLD {
            Ok(FileContent::Owned(fs::read(path)?))
        } else {
            let file = File::open(path)?;
            // SAFETY: File handle is valid (just opened) and the mapping is only
            // read. A concurrent writer can change what a scan sees, which is
            // accepted for read-only analysis of static images.
            let mmap = unsafe { Mmap::map(&file)? };
            Ok(FileContent::Mapped(mmap))
        }
    }

    /// Whether the content is memory-mapped.
    pub fn is_mapped(&self) -> bool {
        matches!(self, FileContent::Mapped(_))
    }

    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AsRef<[u8]> for FileContent {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileContent::Owned(bytes) => bytes,
            FileContent::Mapped(mmap) => mmap,
        }
    }
}

#[cfg(test)]
#[path = "file_reader_tests.rs"]
mod tests;
