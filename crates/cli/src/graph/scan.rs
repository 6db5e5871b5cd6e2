// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential longest-match scanning over a finalized graph.

use super::{EdgeId, Graph, GraphError, NodeId, ROOT};

/// A signature match reported by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScanMatch {
    /// Terminus node; its payloads are available via [`Graph::payloads`].
    pub terminus: NodeId,
    /// Length of the matched signature in bytes.
    pub size: usize,
    /// End offset of the match, including the scan's base offset.
    pub end: usize,
}

impl ScanMatch {
    /// Start offset of the match, including the scan's base offset.
    pub fn start(&self) -> usize {
        self.end - self.size
    }
}

impl<T> Graph<T> {
    /// Finalize if needed and scan `target`.
    ///
    /// `base_offset` is added to every reported end offset. The first
    /// attempt is at position 0 whatever its alignment; after each attempt
    /// the cursor moves forward so that `base_offset + pos` is a multiple of
    /// `align` (0 or 1 disables alignment).
    pub fn scan<'a>(&'a mut self, target: &'a [u8], base_offset: usize, align: usize) -> Matches<'a, T> {
        self.finalize();
        Matches::new(self, target, base_offset, align)
    }

    /// Scan `target` through a shared reference.
    ///
    /// Fails with [`GraphError::NotFinalized`] if edges were inserted since
    /// the last [`Graph::finalize`].
    pub fn matches<'a>(
        &'a self,
        target: &'a [u8],
        base_offset: usize,
        align: usize,
    ) -> Result<Matches<'a, T>, GraphError> {
        if !self.finalized {
            return Err(GraphError::NotFinalized);
        }
        Ok(Matches::new(self, target, base_offset, align))
    }
}

/// Lazy left-to-right stream of non-overlapping matches.
///
/// At each cursor position the trie is explored depth-first, popping the
/// most promising edge first. A terminus without outgoing edges wins
/// immediately; otherwise the longest intermediate terminus seen is
/// reported once every branch is exhausted.
pub struct Matches<'a, T> {
    graph: &'a Graph<T>,
    target: &'a [u8],
    base_offset: usize,
    align: usize,
    pos: usize,
    stack: Vec<(usize, EdgeId)>,
}

impl<'a, T> Matches<'a, T> {
    fn new(graph: &'a Graph<T>, target: &'a [u8], base_offset: usize, align: usize) -> Self {
        Self {
            graph,
            target,
            base_offset,
            align: align.max(1),
            pos: 0,
            stack: Vec::new(),
        }
    }

    fn realign(&mut self) {
        let misalignment = (self.base_offset + self.pos) % self.align;
        if misalignment != 0 {
            self.pos += self.align - misalignment;
        }
    }

    /// Explore every path starting at `start` and pick the winning match.
    fn match_at(&mut self, start: usize) -> Option<ScanMatch> {
        let graph = self.graph;
        let target = self.target;

        self.stack.clear();
        graph.push_candidates(ROOT, target[start], start, &mut self.stack);

        let mut intermediate: Option<ScanMatch> = None;
        while let Some((at, edge_id)) = self.stack.pop() {
            let edge = &graph.edges[edge_id];
            let end = at + edge.len();
            let Some(window) = target.get(at..end) else {
                continue;
            };
            if !edge.fragment.matches(window) {
                continue;
            }

            let node = &graph.nodes[edge.to];
            if !node.payloads.is_empty() {
                let found = ScanMatch {
                    terminus: edge.to,
                    size: edge.match_size,
                    end: end + self.base_offset,
                };
                if !node.has_edges() {
                    return Some(found);
                }
                if intermediate.is_none_or(|best| found.size > best.size) {
                    intermediate = Some(found);
                }
            }

            if let Some(&next) = target.get(end) {
                graph.push_candidates(edge.to, next, end, &mut self.stack);
            }
        }
        intermediate
    }
}

impl<T> Iterator for Matches<'_, T> {
    type Item = ScanMatch;

    fn next(&mut self) -> Option<ScanMatch> {
        while self.pos < self.target.len() {
            let start = self.pos;
            let found = self.match_at(start);
            self.pos = match found {
                Some(m) => m.end - self.base_offset,
                None => start + 1,
            };
            self.realign();
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
