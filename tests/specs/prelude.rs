//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for testing fragscan CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::PredicateBooleanExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Returns a Command configured to run the fragscan binary
pub fn fragscan_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fragscan"));
    cmd.env_remove("FRAGSCAN_CONFIG").env_remove("FRAGSCAN_LOG");
    cmd
}

/// Get path to a test fixture directory
pub fn fixture(name: &str) -> PathBuf {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR should be set");
    PathBuf::from(manifest_dir)
        .parent()
        .expect("parent should exist")
        .parent()
        .expect("grandparent should exist")
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A scratch directory isolated from any enclosing fragscan.toml.
pub struct Project {
    dir: TempDir,
}

#[allow(dead_code)]
impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root and return its path.
    pub fn file(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Copy a fixture file into the project.
    pub fn fixture_file(&self, fixture_name: &str, file: &str) -> PathBuf {
        let content = std::fs::read(fixture(fixture_name).join(file)).unwrap();
        self.file(file, content)
    }

    /// fragscan command running inside the project.
    pub fn cmd(&self) -> Command {
        let mut cmd = fragscan_cmd();
        cmd.current_dir(self.dir.path());
        cmd
    }
}

/// `len` bytes of NOP filler with each `(offset, bytes)` patched in.
pub fn binary(len: usize, patches: &[(usize, &[u8])]) -> Vec<u8> {
    let mut image = vec![0x90u8; len];
    for (offset, bytes) in patches {
        image[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    }
    image
}
