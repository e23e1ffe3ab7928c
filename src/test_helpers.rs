//! Shared test utilities for the neighborly-wiki test suite.
//!
//! Provides the fixture export, lookup helpers that panic with a useful
//! message, and output-directory snapshots for comparing runs.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let resolution = resolve_fixture();
//! let rosie = find_view(&resolution, "Rosie Marsh");
//! assert_eq!(rosie.kind.as_deref(), Some("Character"));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::WikiConfig;
use crate::resolve::{Resolution, ViewRef, resolve};
use crate::store::{self, RecordStore};

/// Two entities, one reference (`Likes.target`, in the stock table).
pub const ALICE_BOB: &str = r#"{
    "1": {"Name": {"value": "Alice"}, "Likes": {"target": 2}},
    "2": {"Name": {"value": "Bob"}}
}"#;

// =========================================================================
// Fixture setup
// =========================================================================

/// Path of the fixture town export (exporter envelope format).
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/town.json")
}

/// Load the fixture town into a store.
pub fn load_fixture() -> RecordStore {
    store::load(&fixture_path()).unwrap()
}

/// Resolve the fixture town with the stock config.
pub fn resolve_fixture() -> Resolution {
    let config = WikiConfig::default();
    resolve(&load_fixture(), &config.reference_table().unwrap(), &config)
}

/// Write an export document into the temp dir and return its path.
pub fn write_input(tmp: &TempDir, json: &str) -> PathBuf {
    let path = tmp.path().join("export.json");
    fs::write(&path, json).unwrap();
    path
}

// =========================================================================
// Lookups — panics with a clear message on miss
// =========================================================================

/// Find a view by display name. Panics if not found.
pub fn find_view<'a>(resolution: &'a Resolution, name: &str) -> ViewRef<'a> {
    resolution
        .views()
        .find(|v| v.view().name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = resolution.views().map(|v| v.view().name.as_str()).collect();
            panic!("entity '{name}' not found. Available: {names:?}")
        })
}

/// Read a generated page. Panics with the directory listing if missing.
pub fn read_page(output: &Path, filename: &str) -> String {
    fs::read_to_string(output.join(filename)).unwrap_or_else(|e| {
        let files: Vec<PathBuf> = snapshot(output).into_keys().collect();
        panic!("cannot read {filename}: {e}. Available: {files:?}")
    })
}

// =========================================================================
// Snapshots
// =========================================================================

/// Every file under `dir` (relative path → bytes).
pub fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    collect(dir, dir, &mut files);
    files
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let relative = path.strip_prefix(root).unwrap().to_path_buf();
            files.insert(relative, fs::read(&path).unwrap());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_resolves_cleanly() {
        let resolution = resolve_fixture();
        assert_eq!(resolution.len(), 13);
        assert!(resolution.warnings().is_empty(), "{:?}", resolution.warnings());
    }

    #[test]
    fn find_view_by_name() {
        let resolution = resolve_fixture();
        let rosie = find_view(&resolution, "Rosie Marsh");
        assert_eq!(rosie.kind.as_deref(), Some("Character"));
        assert_eq!(rosie.active, Some(true));
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn find_view_panics_on_miss() {
        find_view(&resolve_fixture(), "Nobody");
    }

    #[test]
    fn snapshot_walks_subdirectories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("kinds")).unwrap();
        fs::write(tmp.path().join("a.html"), "a").unwrap();
        fs::write(tmp.path().join("kinds/b.html"), "b").unwrap();

        let files = snapshot(tmp.path());
        let names: Vec<PathBuf> = files.into_keys().collect();
        assert_eq!(
            names,
            vec![PathBuf::from("a.html"), Path::new("kinds").join("b.html")]
        );
    }
}
