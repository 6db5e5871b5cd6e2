// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic inputs shared by the benchmarks.

#![allow(dead_code)]

use fragscan::{Fragment, Graph};

/// xorshift64 byte stream, reproducible across runs.
pub struct Bytes(u64);

impl Bytes {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_byte(&mut self) -> u8 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 24) as u8
    }

    pub fn fill(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next_byte()).collect()
    }
}

/// `count` signatures of 8 to 31 bytes, roughly one wildcard in eight.
pub fn signatures(count: usize) -> Vec<Fragment> {
    let mut bytes = Bytes::new(0x5eed);
    (0..count)
        .map(|_| {
            let len = 8 + usize::from(bytes.next_byte() % 24);
            let template = bytes.fill(len);
            let wildcards = (0..len).map(|i| i > 0 && bytes.next_byte() < 32).collect();
            Fragment::new(template, wildcards).expect("lengths match")
        })
        .collect()
}

pub fn graph(fragments: &[Fragment]) -> Graph<usize> {
    let mut graph = Graph::new();
    for (i, fragment) in fragments.iter().enumerate() {
        graph.insert(fragment.clone(), i);
    }
    graph.finalize();
    graph
}

/// Random target of `len` bytes with every tenth signature planted.
pub fn target(len: usize, fragments: &[Fragment]) -> Vec<u8> {
    let mut target = Bytes::new(0xf00d).fill(len);
    let stride = len / fragments.len().max(1);
    for (i, fragment) in fragments.iter().enumerate().step_by(10) {
        let at = (i * stride) & !1;
        if let Some(window) = target.get_mut(at..at + fragment.len()) {
            window.copy_from_slice(fragment.template());
        }
    }
    target
}
