//! The full build: load → resolve → render → write.
//!
//! ```text
//! templates/config.toml ─┐
//! templates/*.toml ──────┼─→ Renderer ─┐
//! export.json ──→ RecordStore ─→ Resolution ─→ site::generate ─→ output/
//! ```
//!
//! Everything that can be wrong with the inputs (config, templates, JSON) is
//! checked before the output directory is touched. Resolution only warns.
//! Write failures are collected in the returned [`BuildSummary`]; the caller
//! decides the exit status.

use crate::config::{self, ConfigError};
use crate::render::{Renderer, group_by_kind};
use crate::resolve::{ResolutionWarning, resolve};
use crate::site::{self, SiteReport, WriteError};
use crate::store::{self, InputError};
use crate::template::{TemplateError, TemplateSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Where to read from and write to.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub templates: PathBuf,
}

/// Entity count of one index group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindCount {
    pub heading: String,
    pub slug: String,
    pub count: usize,
}

/// What a build did.
#[derive(Debug)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub entities: usize,
    pub kinds: Vec<KindCount>,
    pub warnings: Vec<ResolutionWarning>,
    pub site: SiteReport,
}

impl BuildSummary {
    /// Every page was written.
    pub fn is_success(&self) -> bool {
        self.site.is_success()
    }
}

/// Load the config and templates from a template directory.
pub fn load_renderer(templates: &Path) -> Result<Renderer, WikiError> {
    let config = config::load_config(templates).map_err(|source| WikiError::Config {
        path: templates.join("config.toml"),
        source,
    })?;
    let templates = TemplateSet::load(templates)?;
    Ok(Renderer::new(config, templates))
}

/// Run a full build.
pub fn run(options: &BuildOptions) -> Result<BuildSummary, WikiError> {
    let renderer = load_renderer(&options.templates)?;
    let table = renderer
        .config()
        .reference_table()
        .map_err(|source| WikiError::Config {
            path: options.templates.join("config.toml"),
            source,
        })?;

    let store = store::load(&options.input)?;
    info!(
        "loaded {} entities from {}",
        store.len(),
        options.input.display()
    );

    let resolution = resolve(&store, &table, renderer.config());
    let site = site::generate(&resolution, &renderer, &options.output)?;

    let kinds = group_by_kind(&resolution, &renderer.config().kinds)
        .iter()
        .map(|group| KindCount {
            heading: renderer.group_heading(group.kind),
            slug: group.slug.clone(),
            count: group.members.len(),
        })
        .collect();

    Ok(BuildSummary {
        output: options.output.clone(),
        entities: resolution.len(),
        kinds,
        warnings: resolution.warnings().to_vec(),
        site,
    })
}
