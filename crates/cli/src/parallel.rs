// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel signature scanning.
//!
//! The target is cut into overlapping slices (see [`crate::partition`]).
//! Slices go onto a bounded job queue and a fixed pool of worker threads
//! scans them with the sequential scanner. Matches stream back over a
//! result channel. Every worker sends exactly one `Done` message from a
//! drop guard, so the merge loop terminates even if a worker panics.
//!
//! Matches found in the overlap between two slices may be reported twice;
//! deduplication is left to the caller.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use rayon::prelude::*;
use thiserror::Error;

use crate::config::defaults;
use crate::graph::{Graph, ScanMatch};
use crate::partition::slice_partitions;

/// Slice count at which [`ParallelScanner::scan_collect`] switches to rayon.
/// Below this, sequential iteration is faster due to rayon overhead.
const PARALLEL_THRESHOLD: usize = 4;

/// Errors produced when starting a parallel scan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("alignment must be at least 1, got {0}")]
    InvalidAlign(usize),

    #[error("no scan worker could be started")]
    NoWorkers,
}

/// Tuning knobs for a parallel scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelOptions {
    /// Match start alignment in bytes.
    pub align: usize,
    /// Worker threads (None = available parallelism).
    pub workers: Option<usize>,
    /// Bytes added on each side of a slice (None = half the longest signature).
    pub overlap: Option<usize>,
    /// Slice size as a multiple of the longest signature.
    pub delta: usize,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            align: defaults::ALIGN,
            workers: None,
            overlap: None,
            delta: defaults::DELTA,
        }
    }
}

/// Slices and worker count resolved for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub slices: Vec<Range<usize>>,
    pub workers: usize,
    pub overlap: usize,
    pub align: usize,
}

/// A finalized graph shared read-only by scan workers.
pub struct ParallelScanner<T> {
    graph: Arc<Graph<T>>,
}

impl<T> ParallelScanner<T>
where
    T: Send + Sync + 'static,
{
    /// Finalize `graph` and freeze it for concurrent scanning.
    pub fn new(mut graph: Graph<T>) -> Self {
        graph.finalize();
        Self {
            graph: Arc::new(graph),
        }
    }

    /// The frozen graph, for resolving match payloads.
    pub fn graph(&self) -> &Graph<T> {
        &self.graph
    }

    /// Resolve slices and worker count for scanning `ranges` of a target
    /// that is `len` bytes long. Ranges are clamped to the target.
    pub fn plan(
        &self,
        len: usize,
        ranges: &[Range<usize>],
        opts: &ParallelOptions,
    ) -> Result<ScanPlan, ScanError> {
        if opts.align == 0 {
            return Err(ScanError::InvalidAlign(opts.align));
        }

        let longest = self.graph.longest_path();
        let overlap = opts.overlap.unwrap_or_else(|| longest.div_ceil(2));
        let max_slice_size = longest.saturating_mul(opts.delta);
        let workers = opts
            .workers
            .filter(|&n| n > 0)
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, NonZeroUsize::get));

        let clamped: Vec<Range<usize>> = ranges
            .iter()
            .map(|r| r.start.min(len)..r.end.min(len))
            .collect();
        let slices = slice_partitions(&clamped, workers, max_slice_size, overlap, opts.align);

        Ok(ScanPlan {
            workers: workers.min(slices.len()),
            slices,
            overlap,
            align: opts.align,
        })
    }

    /// Start a streaming scan of `ranges` within `target`.
    ///
    /// Matches arrive in no particular order across slices; within one slice
    /// they are left to right. Dropping the returned iterator cancels the
    /// remaining work and joins the workers.
    pub fn scan<B>(
        &self,
        target: Arc<B>,
        ranges: &[Range<usize>],
        opts: &ParallelOptions,
    ) -> Result<ParallelScan, ScanError>
    where
        B: AsRef<[u8]> + Send + Sync + ?Sized + 'static,
    {
        let plan = self.plan((*target).as_ref().len(), ranges, opts)?;

        let (job_tx, job_rx) = crossbeam_channel::bounded(plan.slices.len());
        for slice in &plan.slices {
            // Capacity equals the slice count, so this never blocks or fails.
            let _ = job_tx.send(slice.clone());
        }
        drop(job_tx);

        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(plan.workers);

        for id in 0..plan.workers {
            let worker = Worker {
                id,
                graph: Arc::clone(&self.graph),
                target: Arc::clone(&target),
                jobs: job_rx.clone(),
                cancel: Arc::clone(&cancel),
                align: plan.align,
            };
            let results = result_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("fragscan-worker-{id}"))
                .spawn(move || worker.run(results));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => tracing::error!(worker = id, "failed to spawn scan worker: {}", e),
            }
        }

        if handles.is_empty() && plan.workers > 0 {
            return Err(ScanError::NoWorkers);
        }

        tracing::debug!(
            slices = plan.slices.len(),
            workers = handles.len(),
            overlap = plan.overlap,
            "parallel scan started"
        );

        Ok(ParallelScan {
            results: result_rx,
            pending: handles.len(),
            cancel,
            handles,
        })
    }

    /// Scan `ranges` of `target` and collect every match, ordered by slice.
    ///
    /// Uses the rayon pool instead of dedicated workers. The output is
    /// deterministic for a given target and options.
    pub fn scan_collect(
        &self,
        target: &[u8],
        ranges: &[Range<usize>],
        opts: &ParallelOptions,
    ) -> Result<Vec<ScanMatch>, ScanError> {
        let plan = self.plan(target.len(), ranges, opts)?;
        let graph = &*self.graph;
        let align = plan.align;

        let scan_slice = |slice: &Range<usize>| -> Vec<ScanMatch> {
            let Some(bytes) = target.get(slice.clone()) else {
                return Vec::new();
            };
            match graph.matches(bytes, slice.start, align) {
                Ok(matches) => matches.collect(),
                Err(e) => {
                    tracing::error!("cannot scan slice {:?}: {}", slice, e);
                    Vec::new()
                }
            }
        };

        let per_slice: Vec<Vec<ScanMatch>> = if plan.slices.len() >= PARALLEL_THRESHOLD {
            plan.slices.par_iter().map(scan_slice).collect()
        } else {
            plan.slices.iter().map(scan_slice).collect()
        };

        Ok(per_slice.into_iter().flatten().collect())
    }
}

enum Message {
    Match(ScanMatch),
    Done,
}

/// Sends `Done` when dropped, including during unwinding.
struct DoneGuard {
    results: Sender<Message>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        // The receiver may already be gone if the consumer stopped early.
        let _ = self.results.send(Message::Done);
    }
}

struct Worker<T, B: ?Sized> {
    id: usize,
    graph: Arc<Graph<T>>,
    target: Arc<B>,
    jobs: Receiver<Range<usize>>,
    cancel: Arc<AtomicBool>,
    align: usize,
}

impl<T, B> Worker<T, B>
where
    B: AsRef<[u8]> + ?Sized,
{
    fn run(self, results: Sender<Message>) {
        let guard = DoneGuard { results };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.drain_jobs(&guard.results)));
        if outcome.is_err() {
            tracing::error!(worker = self.id, "scan worker panicked");
        }
    }

    fn drain_jobs(&self, results: &Sender<Message>) {
        let target = (*self.target).as_ref();
        while !self.cancel.load(Ordering::Acquire) {
            let Ok(slice) = self.jobs.try_recv() else {
                break;
            };
            let Some(bytes) = target.get(slice.clone()) else {
                tracing::warn!(worker = self.id, "slice {:?} outside target", slice);
                continue;
            };
            let matches = match self.graph.matches(bytes, slice.start, self.align) {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::error!(worker = self.id, "cannot scan slice {:?}: {}", slice, e);
                    return;
                }
            };

            tracing::trace!(worker = self.id, "scanning slice {:?}", slice);
            for m in matches {
                if results.send(Message::Match(m)).is_err() || self.cancel.load(Ordering::Acquire) {
                    return;
                }
            }
        }
    }
}

/// Streaming merge of matches from all workers.
pub struct ParallelScan {
    results: Receiver<Message>,
    pending: usize,
    cancel: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl ParallelScan {
    /// Number of workers that have not reported completion yet.
    pub fn pending_workers(&self) -> usize {
        self.pending
    }
}

impl Iterator for ParallelScan {
    type Item = ScanMatch;

    fn next(&mut self) -> Option<ScanMatch> {
        while self.pending > 0 {
            match self.results.recv() {
                Ok(Message::Match(m)) => return Some(m),
                Ok(Message::Done) => self.pending -= 1,
                Err(_) => self.pending = 0,
            }
        }
        None
    }
}

impl Drop for ParallelScan {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::error!("scan worker terminated abnormally");
            }
        }
    }
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
