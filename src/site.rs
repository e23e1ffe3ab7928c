//! Site writing.
//!
//! Renders every page and writes it under the output directory:
//!
//! ```text
//! output/
//! ├── index.html              # All entities, grouped by kind
//! ├── 1.html                  # One page per entity (see naming::page_filename)
//! ├── 2.html
//! └── kinds/
//!     ├── character.html      # One listing per kind
//!     └── settlement.html
//! ```
//!
//! Existing files are overwritten; files from earlier runs that no longer
//! correspond to an entity are left alone. A page that cannot be written
//! does not stop the run: the failure is recorded in the [`SiteReport`] and
//! the remaining pages are still written. Only failing to create the output
//! directory itself aborts.

use crate::naming::page_filename;
use crate::render::{Renderer, group_by_kind};
use crate::resolve::Resolution;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Subdirectory holding the per-kind listings.
pub const KINDS_DIR: &str = "kinds";

#[derive(Error, Debug)]
#[error("cannot write {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Outcome of [`generate`].
#[derive(Debug, Default)]
pub struct SiteReport {
    pub entity_pages: usize,
    pub index_pages: usize,
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteError>,
}

impl SiteReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, result: Result<PathBuf, WriteError>) -> bool {
        match result {
            Ok(path) => {
                debug!("wrote {}", path.display());
                self.written.push(path);
                true
            }
            Err(e) => {
                warn!("{e}");
                self.failures.push(e);
                false
            }
        }
    }
}

/// Write `content` to `output_dir/filename`, creating directories as needed
/// and replacing any existing file.
pub fn write(output_dir: &Path, filename: &str, content: &str) -> Result<PathBuf, WriteError> {
    let path = output_dir.join(filename);
    let dir = path.parent().unwrap_or(output_dir);
    fs::create_dir_all(dir).map_err(|source| WriteError {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, content).map_err(|source| WriteError {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Render and write every entity page, the index page and the kind pages.
pub fn generate(
    resolution: &Resolution,
    renderer: &Renderer,
    output_dir: &Path,
) -> Result<SiteReport, WriteError> {
    fs::create_dir_all(output_dir).map_err(|source| WriteError {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut report = SiteReport::default();

    for view in resolution.views() {
        let html = renderer.render_entity(view);
        if report.record(write(output_dir, &page_filename(&view.id), &html)) {
            report.entity_pages += 1;
        }
    }

    let groups = group_by_kind(resolution, &renderer.config().kinds);

    let index_html = renderer.render_index(resolution, &groups);
    if report.record(write(output_dir, "index.html", &index_html)) {
        report.index_pages += 1;
    }

    if renderer.templates().index().kind_pages {
        for group in &groups {
            let html = renderer.render_kind_page(resolution, group);
            let filename = format!("{KINDS_DIR}/{}.html", group.slug);
            if report.record(write(output_dir, &filename, &html)) {
                report.index_pages += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WikiConfig;
    use crate::resolve::resolve;
    use crate::store::RecordStore;
    use crate::template::TemplateSet;
    use tempfile::TempDir;

    fn setup(json: &str) -> (Resolution, Renderer) {
        let config = WikiConfig::default();
        let store = RecordStore::from_json_str(json).unwrap();
        let resolution = resolve(&store, &config.reference_table().unwrap(), &config);
        (resolution, Renderer::new(config, TemplateSet::stock()))
    }

    const SMALL: &str = r#"{
        "1": {"Name": {"value": "Alice"}, "Character": {}},
        "2": {"Name": {"value": "Oakvale"}, "Settlement": {"districts": []}},
        "3": {"Name": {"value": "Rock"}}
    }"#;

    #[test]
    fn write_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("a").join("b");
        let path = write(&out, "kinds/x.html", "hello").unwrap();
        assert_eq!(path, out.join("kinds").join("x.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn write_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "1.html", "old").unwrap();
        write(tmp.path(), "1.html", "new").unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("1.html")).unwrap(), "new");
    }

    #[test]
    fn generate_writes_every_page() {
        let tmp = TempDir::new().unwrap();
        let (resolution, renderer) = setup(SMALL);
        let report = generate(&resolution, &renderer, tmp.path()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.entity_pages, 3);
        // index + settlement + character + other
        assert_eq!(report.index_pages, 4);
        for file in [
            "1.html",
            "2.html",
            "3.html",
            "index.html",
            "kinds/settlement.html",
            "kinds/character.html",
            "kinds/_other.html",
        ] {
            assert!(tmp.path().join(file).is_file(), "missing {file}");
        }
    }

    #[test]
    fn generate_empty_dataset_writes_index_only() {
        let tmp = TempDir::new().unwrap();
        let (resolution, renderer) = setup("{}");
        let report = generate(&resolution, &renderer, tmp.path()).unwrap();

        assert_eq!(report.entity_pages, 0);
        assert_eq!(report.written, vec![tmp.path().join("index.html")]);
    }

    #[test]
    fn generate_skips_kind_pages_when_disabled() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.toml"), "kind_pages = false").unwrap();
        let templates = TemplateSet::load(tmp.path()).unwrap();
        let config = WikiConfig::default();
        let store = RecordStore::from_json_str(SMALL).unwrap();
        let resolution = resolve(&store, &config.reference_table().unwrap(), &config);
        let renderer = Renderer::new(config, templates);

        let out = tmp.path().join("out");
        let report = generate(&resolution, &renderer, &out).unwrap();
        assert_eq!(report.index_pages, 1);
        assert!(!out.join(KINDS_DIR).exists());
    }

    #[test]
    fn generate_collects_write_failures_and_continues() {
        let tmp = TempDir::new().unwrap();
        // A directory where page 1 should go makes that one write fail.
        fs::create_dir(tmp.path().join("1.html")).unwrap();
        let (resolution, renderer) = setup(SMALL);

        let report = generate(&resolution, &renderer, tmp.path()).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, tmp.path().join("1.html"));
        assert_eq!(report.entity_pages, 2);
        assert!(tmp.path().join("2.html").is_file());
        assert!(tmp.path().join("index.html").is_file());
    }

    #[test]
    fn generate_fails_when_output_dir_cannot_be_created() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let (resolution, renderer) = setup(SMALL);

        let err = generate(&resolution, &renderer, &blocker.join("out")).unwrap_err();
        assert!(err.to_string().contains("cannot write"));
    }

    #[test]
    fn entity_named_index_keeps_its_own_page() {
        let tmp = TempDir::new().unwrap();
        let (resolution, renderer) = setup(
            r#"{"index": {"Name": {"value": "Zed"}}, "2": {"Name": {"value": "Ann"}}}"#,
        );
        let report = generate(&resolution, &renderer, tmp.path()).unwrap();

        assert!(report.is_success());
        let zed = fs::read_to_string(tmp.path().join("_69ndex.html")).unwrap();
        assert!(zed.contains("<h1>Zed</h1>"));
        let home = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(home.contains(r#"<a href="_69ndex.html">Zed</a>"#));
        let index_writes = report
            .written
            .iter()
            .filter(|p| p.ends_with("index.html"))
            .count();
        assert_eq!(index_writes, 1);
    }

    #[test]
    fn generate_leaves_unrelated_files_alone() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("stale.html"), "old run").unwrap();
        let (resolution, renderer) = setup(SMALL);
        generate(&resolution, &renderer, tmp.path()).unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("stale.html")).unwrap(),
            "old run"
        );
    }
}
