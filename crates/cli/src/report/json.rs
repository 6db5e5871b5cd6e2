// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON format report output.

use super::{ReportEntry, ReportFormatter};

/// JSON format report formatter: an array of `{start, end, size, names}`.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, entries: &[ReportEntry]) -> anyhow::Result<String> {
        let mut output = serde_json::to_string_pretty(entries)?;
        output.push('\n');
        Ok(output)
    }
}
