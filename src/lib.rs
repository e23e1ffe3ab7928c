//! # Neighborly Wiki
//!
//! Turns a JSON export of a Neighborly town simulation into a static HTML
//! wiki: one page per simulated entity ("GameObject"), an index grouped by
//! kind, and one listing per kind. The output is plain HTML with inline CSS
//! and relative links, so any static file server (or none) can show it.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load      export.json   →  RecordStore   (raw components, input order)
//! 2. Resolve   RecordStore   →  Resolution    (references linked, warnings)
//! 3. Render    Resolution    →  HTML strings  (TOML layouts + maud)
//! 4. Write     HTML          →  output/
//! ```
//!
//! Config and templates are loaded and validated before the export is read,
//! and the export is fully parsed before anything is written. A bad input
//! never leaves a half-written site behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Parses the export (flat or exporter envelope) into records |
//! | [`refs`] | Reference patterns: which component fields hold entity IDs |
//! | [`resolve`] | Links references into an arena of views; backlinks; warnings |
//! | [`template`] | TOML page layouts, field paths, stock and user template sets |
//! | [`render`] | Entity, index and kind pages with maud |
//! | [`site`] | Writes pages to the output directory, collecting failures |
//! | [`pipeline`] | The whole run, used by the CLI and integration tests |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`naming`] | Kind slugs and labels, entity page file names |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Reference Table
//!
//! The export does not mark which numbers are entity IDs. Rather than guess
//! from field names, the config carries a table of reference patterns per
//! component (`Business = ["district", "owner", "employees"]`). The stock
//! table covers the simulation's components; a user `config.toml` adds to it.
//!
//! ## Arena Resolution
//!
//! Relationships are full of cycles (A likes B, B likes A; a residence lists
//! its residents, each resident names the residence). Resolved views live in
//! one arena and references are slot indices into it, so a cycle is just two
//! numbers and following a reference always yields the one shared view.
//!
//! ## Layouts, Not Template Code
//!
//! Templates choose and order data; they do not produce markup. A layout is
//! a short TOML file of typed sections with field paths such as
//! `Resident.residence.@parent`. Markup is compiled in with maud, which keeps
//! every page well-formed and every value escaped, and makes a typo in a
//! template a startup error instead of a broken page.

pub mod config;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod refs;
pub mod render;
pub mod resolve;
pub mod site;
pub mod store;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
