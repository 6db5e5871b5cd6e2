// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Splitting address ranges into worker-sized scan slices.
//!
//! Each input range is cut into aligned cores. Every emitted slice is its
//! core widened by `overlap` bytes on both sides (clamped to the range), so
//! two neighbouring slices share at least `2 * overlap` bytes. Any window of
//! up to `2 * overlap` bytes inside a range therefore lies entirely within
//! at least one slice.

use std::ops::Range;

/// Round `n` up to the next multiple of `align`.
pub fn align_up(n: usize, align: usize) -> usize {
    if align <= 1 {
        return n;
    }
    n.div_ceil(align).saturating_mul(align)
}

/// Round `n` down to a multiple of `align`.
pub fn align_down(n: usize, align: usize) -> usize {
    if align <= 1 {
        return n;
    }
    n - n % align
}

/// Partition `ranges` into overlapping, aligned slices.
///
/// The core size is `ceil(len / workers)` capped by `max_slice_size`
/// (0 means no cap), never smaller than `overlap` or `align`. Empty ranges
/// are skipped. Output order follows input order.
pub fn slice_partitions(
    ranges: &[Range<usize>],
    workers: usize,
    max_slice_size: usize,
    overlap: usize,
    align: usize,
) -> Vec<Range<usize>> {
    let align = align.max(1);
    let workers = workers.max(1);
    let mut slices = Vec::new();

    for range in ranges {
        if range.is_empty() {
            continue;
        }

        let mut step = range.len().div_ceil(workers);
        if max_slice_size > 0 {
            step = step.min(max_slice_size);
        }
        let step = align_up(step.max(overlap).max(1), align);

        let mut core_start = range.start;
        while core_start < range.end {
            let core_end = align_up(core_start.saturating_add(step), align).min(range.end);
            let lo = align_down(core_start.saturating_sub(overlap), align).max(range.start);
            let hi = core_end.saturating_add(overlap).min(range.end);
            slices.push(lo..hi);
            core_start = core_end;
        }
    }

    tracing::trace!(ranges = ranges.len(), slices = slices.len(), "partitioned scan ranges");
    slices
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
