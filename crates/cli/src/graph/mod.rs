// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fragment trie for signature matching.
//!
//! The graph is a radix trie over [`Fragment`]s stored in two flat arenas:
//! nodes and edges, both addressed by index. Edges whose fragment starts
//! with a literal byte are bucketed per node by `byte % bin_count`; edges
//! starting with a wildcard live in a separate per-node list that is always
//! searched linearly.
//!
//! Lifecycle:
//! 1. [`Graph::insert`] signatures (mutable build phase).
//! 2. [`Graph::finalize`] computes edge weights and orders every edge list.
//! 3. Scan with [`Graph::scan`] / [`Graph::matches`], or share the graph
//!    read-only across threads via [`crate::parallel::ParallelScanner`].

mod scan;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::fragment::Fragment;

pub use scan::{Matches, ScanMatch};

/// Default number of first-byte bins per node (one per byte value).
pub const DEFAULT_BIN_COUNT: usize = 256;

/// Index of a node in the graph arena. The root is node 0.
pub type NodeId = usize;

/// Index of an edge in the graph arena.
pub type EdgeId = usize;

const ROOT: NodeId = 0;

/// Errors produced when using a graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph must be finalized before scanning")]
    NotFinalized,
}

/// Relation between an existing edge and the remaining part of a new pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    /// No shared prefix.
    Disjunct,
    /// The pattern ends exactly at the end of the edge.
    Equal,
    /// The whole edge is a prefix of the pattern; descend.
    Part,
    /// The pattern diverges inside the edge after this many positions.
    Branch(usize),
}

/// A transition between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    fragment: Fragment,
    to: NodeId,
    match_size: usize,
    weight: f64,
}

impl Edge {
    fn new(to: NodeId, fragment: Fragment, match_size: usize) -> Self {
        Self {
            fragment,
            to,
            match_size,
            weight: match_size as f64,
        }
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn len(&self) -> usize {
        self.fragment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    /// Total pattern length from the root to the end of this edge.
    pub fn match_size(&self) -> usize {
        self.match_size
    }

    /// Ordering weight assigned by the last finalize pass.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    fn classify(&self, path: &Fragment) -> Relation {
        let prefix = self.fragment.longest_common_prefix(path);
        if prefix == 0 {
            Relation::Disjunct
        } else if prefix == self.len() {
            if path.len() == prefix { Relation::Equal } else { Relation::Part }
        } else {
            Relation::Branch(prefix)
        }
    }
}

/// Adjacency and payloads of a single node.
#[derive(Debug, Clone)]
struct Node<T> {
    bins: BTreeMap<usize, Vec<EdgeId>>,
    fuzzy: Vec<EdgeId>,
    payloads: Vec<T>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            bins: BTreeMap::new(),
            fuzzy: Vec::new(),
            payloads: Vec::new(),
        }
    }

    fn has_edges(&self) -> bool {
        !self.fuzzy.is_empty() || self.bins.values().any(|edges| !edges.is_empty())
    }

    fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.bins.values().flatten().chain(&self.fuzzy).copied()
    }

    fn edge_lists_mut(&mut self) -> impl Iterator<Item = &mut Vec<EdgeId>> + '_ {
        self.bins.values_mut().chain(std::iter::once(&mut self.fuzzy))
    }
}

/// Signature trie mapping byte fragments to payloads.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    nodes: Vec<Node<T>>,
    edges: Vec<Edge>,
    bin_count: usize,
    longest_path: usize,
    finalized: bool,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T> {
    /// Create an empty graph with one bin per byte value.
    pub fn new() -> Self {
        Self::with_bin_count(DEFAULT_BIN_COUNT)
    }

    /// Create an empty graph with `bin_count` first-byte bins per node.
    ///
    /// Fewer bins trade lookup selectivity for smaller per-node maps.
    pub fn with_bin_count(bin_count: usize) -> Self {
        Self {
            nodes: vec![Node::new()],
            edges: Vec::new(),
            bin_count: bin_count.max(1),
            longest_path: 0,
            finalized: false,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Longest pattern length in the graph (valid after finalize).
    pub fn longest_path(&self) -> usize {
        self.longest_path
    }

    /// Payloads attached to `node`; empty unless it is a terminus.
    pub fn payloads(&self, node: NodeId) -> &[T] {
        self.nodes.get(node).map(|n| n.payloads.as_slice()).unwrap_or_default()
    }

    /// Outgoing edges of `node`: literal bins first, then fuzzy-start edges.
    pub fn edges_from(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|n| n.edge_ids())
            .map(|id| &self.edges[id])
    }

    fn to_bin(&self, byte: u8) -> usize {
        usize::from(byte) % self.bin_count
    }

    fn new_node(&mut self) -> NodeId {
        self.nodes.push(Node::new());
        self.nodes.len() - 1
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId, fragment: Fragment, match_size: usize) {
        let id = self.edges.len();
        let bin = fragment.leading_literal_byte().map(|b| self.to_bin(b));
        self.edges.push(Edge::new(to, fragment, match_size));
        let node = &mut self.nodes[from];
        match bin {
            Some(bin) => node.bins.entry(bin).or_default().push(id),
            None => node.fuzzy.push(id),
        }
    }

    /// Split `edge_id` after `at` positions and return the new middle node.
    ///
    /// The head keeps the first `at` positions and now ends at the new node;
    /// a tail edge carries the rest to the old destination with the old
    /// `match_size`.
    fn split_edge(&mut self, edge_id: EdgeId, at: usize) -> NodeId {
        let middle = self.new_node();
        let edge = &mut self.edges[edge_id];
        let suffix = edge.fragment.split_at(at);
        let tail_size = edge.match_size;
        // The head reports the depth of the split point, not `match_size - at`;
        // the two only agree when the split edge leaves the root.
        edge.match_size -= suffix.len();
        let old_to = std::mem::replace(&mut edge.to, middle);
        self.add_edge(middle, old_to, suffix, tail_size);
        middle
    }

    fn candidates(&self, node: NodeId, path: &Fragment) -> &[EdgeId] {
        let node = &self.nodes[node];
        match path.leading_literal_byte() {
            Some(byte) => {
                let bin = self.to_bin(byte);
                node.bins.get(&bin).map(Vec::as_slice).unwrap_or_default()
            }
            None => &node.fuzzy,
        }
    }

    fn attach(&mut self, node: NodeId, payload: T) -> bool {
        let payloads = &mut self.nodes[node].payloads;
        let created = payloads.is_empty();
        payloads.push(payload);
        created
    }

    /// Insert `fragment` and attach `payload` to its terminus.
    ///
    /// Returns true when the fragment needed a new node (a leaf, or the
    /// middle node of a split) and false when it ends at a node that already
    /// existed, whether or not that node carried payloads before.
    pub fn insert(&mut self, mut fragment: Fragment, payload: T) -> bool {
        if fragment.is_empty() {
            tracing::warn!("ignoring empty fragment");
            return false;
        }
        self.finalized = false;

        let original_size = fragment.len();
        let mut node = ROOT;

        'descend: loop {
            let candidates = self.candidates(node, &fragment).to_vec();
            for edge_id in candidates {
                let edge = &self.edges[edge_id];
                match edge.classify(&fragment) {
                    Relation::Disjunct => continue,
                    Relation::Part => {
                        fragment.drop_before(edge.len());
                        node = edge.to;
                        continue 'descend;
                    }
                    Relation::Equal => {
                        let to = edge.to;
                        if self.attach(to, payload) {
                            tracing::debug!(node = to, "terminus added at existing branch point");
                        } else {
                            tracing::debug!(node = to, "duplicate fragment, payload appended");
                        }
                        return false;
                    }
                    Relation::Branch(at) => {
                        let middle = self.split_edge(edge_id, at);
                        fragment.drop_before(at);
                        if fragment.is_empty() {
                            tracing::debug!(node = middle, "terminus added after a new branch");
                            return self.attach(middle, payload);
                        }
                        let leaf = self.new_node();
                        self.add_edge(middle, leaf, fragment, original_size);
                        self.attach(leaf, payload);
                        tracing::debug!(node = leaf, "fragment added on a new branch");
                        return true;
                    }
                }
            }

            let leaf = self.new_node();
            self.add_edge(node, leaf, fragment, original_size);
            self.attach(leaf, payload);
            tracing::debug!(node = leaf, "fragment added as a new leaf");
            return true;
        }
    }

    /// Edge ids in depth-first pre-order from the root.
    ///
    /// Every edge appears before all edges below it, so walking the result
    /// in reverse visits children before parents.
    fn preorder_edges(&self) -> Vec<EdgeId> {
        let mut order = Vec::with_capacity(self.edges.len());
        let mut stack: Vec<EdgeId> = self.nodes[ROOT].edge_ids().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[self.edges[id].to].edge_ids());
        }
        order
    }

    /// Set every edge weight to the length-weighted mean wildcard ratio of
    /// its fragment and the whole subtree below it.
    fn weigh_fuzziness(&mut self, order: &[EdgeId]) {
        let mut stats = vec![(0.0, 0usize); self.edges.len()];
        for &id in order.iter().rev() {
            let below = weighted_mean(self.nodes[self.edges[id].to].edge_ids().map(|c| stats[c]));
            let edge = &mut self.edges[id];
            let own = (edge.fragment.wildcard_ratio(), edge.len());
            stats[id] = weighted_mean([own, below]);
            edge.weight = stats[id].0;
        }
    }

    /// Set every edge weight to the longest match reachable through it and
    /// return the overall maximum.
    fn weigh_match_size(&mut self, order: &[EdgeId]) -> usize {
        let mut reach = vec![0usize; self.edges.len()];
        for &id in order.iter().rev() {
            let below = self.nodes[self.edges[id].to]
                .edge_ids()
                .map(|c| reach[c])
                .max()
                .unwrap_or(0);
            let edge = &mut self.edges[id];
            reach[id] = edge.match_size.max(below);
            edge.weight = reach[id] as f64;
        }
        self.nodes[ROOT].edge_ids().map(|id| reach[id]).max().unwrap_or(0)
    }

    fn sort_edges(&mut self, descending: bool) {
        let edges = &self.edges;
        for node in &mut self.nodes {
            for list in node.edge_lists_mut() {
                if descending {
                    list.sort_by(|&a, &b| edges[b].weight.total_cmp(&edges[a].weight));
                } else {
                    list.sort_by(|&a, &b| edges[a].weight.total_cmp(&edges[b].weight));
                }
            }
        }
    }

    /// Compute edge priorities and order all edge lists for scanning.
    ///
    /// Lists end up sorted by longest reachable match, ascending; equal
    /// sizes keep the less fuzzy edge later. The scanner pops from the end,
    /// so it tries long, specific paths first. Idempotent.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        let order = self.preorder_edges();

        self.weigh_fuzziness(&order);
        self.sort_edges(true);

        self.longest_path = self.weigh_match_size(&order);
        self.sort_edges(false);

        self.finalized = true;
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            longest_path = self.longest_path,
            "graph finalized"
        );
    }

    /// Push the edges leaving `node` that may match `byte` at `at`.
    ///
    /// The literal bin goes first and fuzzy-start edges on top, so fuzzy
    /// paths are popped first.
    fn push_candidates(&self, node: NodeId, byte: u8, at: usize, stack: &mut Vec<(usize, EdgeId)>) {
        let node = &self.nodes[node];
        if let Some(bin) = node.bins.get(&self.to_bin(byte)) {
            stack.extend(bin.iter().map(|&id| (at, id)));
        }
        stack.extend(node.fuzzy.iter().map(|&id| (at, id)));
    }
}

/// Combine `(ratio, count)` pairs into their count-weighted mean.
fn weighted_mean(parts: impl IntoIterator<Item = (f64, usize)>) -> (f64, usize) {
    let (sum, count) = parts
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), (ratio, n)| (sum + ratio * n as f64, count + n));
    if count == 0 { (0.0, 0) } else { (sum / count as f64, count) }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
