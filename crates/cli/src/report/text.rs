// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text format report output.

use std::fmt::Write;

use super::{ReportEntry, ReportFormatter};

/// Text format report formatter: `0x<start> 0x<end> <size> <names>`.
pub struct TextFormatter;

/// Per-line estimate for pre-allocation.
const TEXT_LINE_SIZE: usize = 48;

impl ReportFormatter for TextFormatter {
    fn format(&self, entries: &[ReportEntry]) -> anyhow::Result<String> {
        let mut output = String::with_capacity(entries.len() * TEXT_LINE_SIZE);
        for entry in entries {
            writeln!(
                output,
                "0x{:08x} 0x{:08x} {} {}",
                entry.start,
                entry.end,
                entry.size,
                entry.names.join(",")
            )?;
        }
        Ok(output)
    }
}
