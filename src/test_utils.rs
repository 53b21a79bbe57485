//! Shared test utilities.
//!
//! Common helpers used across multiple test modules; only compiled for
//! test builds.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::loader::MemLoader;
use crate::registry::FragmentRegistry;

/// Creates a temporary documents directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: the temp directory handle (must be kept alive for the test
///   duration)
/// - PathBuf: the path to the docs subdirectory
///
/// A non-hidden subdirectory is used because directory-walking consumers
/// skip hidden paths, and on some systems temp directories are created
/// under names like `/tmp/.tmpXXXXX`.
pub fn create_test_docs_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir(&docs_dir).expect("Failed to create docs subdirectory");
    (temp_dir, docs_dir)
}

/// Builds a registry over an in-memory document set with default settings.
pub fn mem_registry(documents: &[(&str, &str)]) -> FragmentRegistry {
    let loader: MemLoader = documents.iter().copied().collect();
    FragmentRegistry::new(loader)
}
