// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unit tests for sequential scanning.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use yare::parameterized;

use crate::fragment::Fragment;
use crate::graph::Graph;

fn graph_of(patterns: &[(&str, &'static str)]) -> Graph<&'static str> {
    let mut graph = Graph::new();
    for (pattern, name) in patterns {
        graph.insert(Fragment::parse(pattern).unwrap(), *name);
    }
    graph.finalize();
    graph
}

fn lit_graph(patterns: &[(&[u8], &'static str)]) -> Graph<&'static str> {
    let mut graph = Graph::new();
    for (bytes, name) in patterns {
        graph.insert(Fragment::literal(bytes), *name);
    }
    graph.finalize();
    graph
}

/// Scan and flatten every match to (payloads, size, end).
fn scan_all(
    graph: &Graph<&'static str>,
    target: &[u8],
    base: usize,
    align: usize,
) -> Vec<(Vec<&'static str>, usize, usize)> {
    graph
        .matches(target, base, align)
        .unwrap()
        .map(|m| (graph.payloads(m.terminus).to_vec(), m.size, m.end))
        .collect()
}

#[test]
fn finds_each_disjoint_fragment() {
    let graph = lit_graph(&[(b"AB", "ab"), (b"CD", "cd"), (b"EF", "ef")]);
    assert_eq!(
        scan_all(&graph, b"ABCDEF", 0, 2),
        vec![(vec!["ab"], 2, 2), (vec!["cd"], 2, 4), (vec!["ef"], 2, 6)]
    );
}

#[test]
fn duplicate_signatures_share_terminus() {
    let mut graph = Graph::new();
    graph.insert(Fragment::literal(b"ABCD"), "p1");
    graph.insert(Fragment::literal(b"ABCD"), "p2");

    let found: Vec<_> = graph.scan(b"ABCD", 0, 2).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(graph.payloads(found[0].terminus), &["p1", "p2"]);
}

#[parameterized(
    first_branch = { b"ABCD", "abcd" },
    second_branch = { b"ABXY", "abxy" },
)]
fn branch_reports_only_its_own_payload(target: &[u8], expected: &'static str) {
    let graph = lit_graph(&[(b"ABCD", "abcd"), (b"ABXY", "abxy")]);
    assert_eq!(scan_all(&graph, target, 0, 2), vec![(vec![expected], 4, 4)]);
}

#[parameterized(
    lower_x = { b"AxC" },
    lower_z = { b"AzC" },
    zero_byte = { b"A\0C" },
)]
fn wildcard_matches_any_byte(target: &[u8]) {
    let graph = graph_of(&[("41 ?? 43", "fuzzy")]);
    assert_eq!(scan_all(&graph, target, 0, 1), vec![(vec!["fuzzy"], 3, 3)]);
}

#[test]
fn longer_extension_wins_over_prefix() {
    let graph = lit_graph(&[(b"AB", "short"), (b"ABCD", "long")]);
    assert_eq!(scan_all(&graph, b"ABCD", 0, 2), vec![(vec!["long"], 4, 4)]);
}

#[test]
fn prefix_reported_when_extension_fails() {
    let graph = lit_graph(&[(b"AB", "short"), (b"ABCD", "long")]);
    assert_eq!(scan_all(&graph, b"ABCE", 0, 2), vec![(vec!["short"], 2, 2)]);
}

#[test]
fn split_prefix_reports_its_own_length() {
    let graph = lit_graph(&[(b"ABCDEF", "long"), (b"AB", "short")]);
    assert_eq!(scan_all(&graph, b"ABxx", 0, 2), vec![(vec!["short"], 2, 2)]);
    assert_eq!(scan_all(&graph, b"ABCDEF", 0, 2), vec![(vec!["long"], 6, 6)]);
}

#[test]
fn longest_intermediate_wins_when_no_leaf_matches() {
    let graph = lit_graph(&[
        (b"AB", "ab"),
        (b"ABCD", "abcd"),
        (b"ABCDEFGH", "full"),
        (b"ABXY", "abxy"),
    ]);
    assert_eq!(scan_all(&graph, b"ABCDEFxx", 0, 2), vec![(vec!["abcd"], 4, 4)]);
}

#[test]
fn fuzzy_leaf_is_tried_before_literal_leaf() {
    let graph = graph_of(&[("?? 42 43", "fuzzy"), ("41 42 43", "literal")]);
    assert_eq!(scan_all(&graph, b"ABC", 0, 1), vec![(vec!["fuzzy"], 3, 3)]);
    assert_eq!(scan_all(&graph, b"ZBC", 0, 1), vec![(vec!["fuzzy"], 3, 3)]);
}

#[test]
fn literal_leaf_matches_when_fuzzy_leaf_fails() {
    let graph = graph_of(&[("?? 42 58", "fuzzy"), ("41 42 43", "literal")]);
    assert_eq!(scan_all(&graph, b"ABC", 0, 1), vec![(vec!["literal"], 3, 3)]);
}

#[test]
fn fuzzy_child_is_tried_before_literal_child() {
    let graph = graph_of(&[("41 ?? 43", "fuzzy"), ("41 42 43", "literal")]);
    assert_eq!(scan_all(&graph, b"ABC", 0, 1), vec![(vec!["fuzzy"], 3, 3)]);
}

#[test]
fn fragment_past_end_is_not_matched() {
    let graph = lit_graph(&[(b"ABCD", "abcd")]);
    assert!(scan_all(&graph, b"ABC", 0, 1).is_empty());
    assert!(scan_all(&graph, b"", 0, 1).is_empty());
}

#[test]
fn alignment_skips_unaligned_occurrences() {
    let graph = lit_graph(&[(b"WXYZ", "wxyz")]);
    let target = b"xWXYZxxxWXYZ";

    assert_eq!(scan_all(&graph, target, 0, 4), vec![(vec!["wxyz"], 4, 12)]);
    assert_eq!(
        scan_all(&graph, target, 0, 1),
        vec![(vec!["wxyz"], 4, 5), (vec!["wxyz"], 4, 12)]
    );
}

#[test]
fn base_offset_is_added_to_end() {
    let graph = lit_graph(&[(b"WXYZ", "wxyz")]);
    let found: Vec<_> = graph.matches(b"WXYZ", 0x1000, 4).unwrap().collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].end, 0x1004);
    assert_eq!(found[0].start(), 0x1000);
}

#[test]
fn first_position_is_tried_at_unaligned_base() {
    let graph = lit_graph(&[(b"WX", "wx")]);
    assert_eq!(scan_all(&graph, b"WXxx", 1, 2), vec![(vec!["wx"], 2, 3)]);
    assert_eq!(scan_all(&graph, b"WXxxWX", 0x1001, 4), vec![(vec!["wx"], 2, 0x1003)]);
}

#[test]
fn alignment_is_relative_to_absolute_address() {
    let graph = lit_graph(&[(b"WX", "wx")]);
    // base 1: target offset 1 is absolute address 2, the first aligned slot.
    assert_eq!(scan_all(&graph, b"xWXx", 1, 2), vec![(vec!["wx"], 2, 4)]);
}

#[test]
fn consumer_can_stop_early() {
    let graph = lit_graph(&[(b"AB", "ab")]);
    let target = b"AB".repeat(1000);
    let mut matches = graph.matches(&target, 0, 2).unwrap();
    assert_eq!(matches.next().map(|m| m.end), Some(2));
    assert_eq!(matches.next().map(|m| m.end), Some(4));
}

#[test]
fn rescanning_is_repeatable() {
    let graph = lit_graph(&[(b"AB", "ab"), (b"CD", "cd")]);
    let first = scan_all(&graph, b"xxABCDAB", 0, 2);
    let second = scan_all(&graph, b"xxABCDAB", 0, 2);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn scan_finalizes_on_demand() {
    let mut graph = Graph::new();
    graph.insert(Fragment::literal(b"AB"), "ab");
    assert!(graph.matches(b"AB", 0, 1).is_err());
    assert_eq!(graph.scan(b"AB", 0, 1).count(), 1);
    assert!(graph.is_finalized());
}

#[test]
fn empty_graph_finds_nothing() {
    let mut graph: Graph<&str> = Graph::new();
    assert_eq!(graph.scan(b"anything at all", 0, 1).count(), 0);
}

fn arb_patterns() -> impl Strategy<Value = Vec<Vec<Option<u8>>>> {
    let byte = prop_oneof![
        4 => (b'A'..=b'C').prop_map(Some),
        1 => Just(None),
    ];
    prop::collection::vec(prop::collection::vec(byte, 1..6), 1..12)
}

fn to_fragment(pattern: &[Option<u8>]) -> Fragment {
    let template = pattern.iter().map(|b| b.unwrap_or(0)).collect();
    let wildcards = pattern.iter().map(Option::is_none).collect();
    Fragment::new(template, wildcards).unwrap()
}

proptest! {
    #[test]
    fn reported_matches_are_genuine_and_ordered(
        patterns in arb_patterns(),
        target in prop::collection::vec(b'A'..=b'D', 0..96),
        base in 0usize..8,
        align in 1usize..5,
    ) {
        let mut graph = Graph::new();
        for (i, pattern) in patterns.iter().enumerate() {
            graph.insert(to_fragment(pattern), i);
        }
        graph.finalize();

        let mut last_end = base;
        for m in graph.matches(&target, base, align).unwrap() {
            prop_assert!(m.start() >= last_end, "overlapping match {:?}", m);
            prop_assert!(m.start() == base || m.start() % align == 0);
            prop_assert!(m.end <= base + target.len());

            let window = &target[m.start() - base..m.end - base];
            let payloads = graph.payloads(m.terminus);
            prop_assert!(!payloads.is_empty());
            for &i in payloads {
                prop_assert_eq!(patterns[i].len(), m.size);
                prop_assert!(to_fragment(&patterns[i]).matches(window));
            }
            last_end = m.end;
        }
    }
}
