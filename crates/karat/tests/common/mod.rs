//! Shared helpers for karat integration tests.
//!
//! - `TestStore` opens a file-backed store in a temp directory
//! - builders for the inputs the store takes

#![allow(dead_code)]

pub mod builders;

pub use builders::*;

use std::path::PathBuf;

use karat::{Config, ErpStore};
use tempfile::TempDir;

/// A store backed by a database file that lives as long as the harness.
pub struct TestStore {
    pub store: ErpStore,
    pub dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = ErpStore::open(Self::config_for(&dir)).expect("Failed to open store");
        Self { store, dir }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("karat.db")
    }

    /// Opens a second store on the same database file.
    pub fn reopen(&self) -> ErpStore {
        ErpStore::open(Self::config_for(&self.dir)).expect("Failed to reopen store")
    }

    fn config_for(dir: &TempDir) -> Config {
        Config {
            database_path: Some(dir.path().join("karat.db").to_string_lossy().into_owned()),
            ..Config::default()
        }
    }
}
