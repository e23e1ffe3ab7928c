//! Naming conventions shared by templates and output files.
//!
//! Kinds are component names such as `ResidentialBuilding`. They show up in
//! three forms:
//! - `residential_building` — template file stem and per-kind index file
//! - `Residential Building` — display label
//! - the raw component name, in the data
//!
//! Entity IDs become file names. IDs are arbitrary strings in the export, so
//! every byte outside `[A-Za-z0-9-]` is escaped as `_xx` (lowercase hex). The
//! mapping is injective, and no ID can produce a path separator or `..`:
//! - `42` → `42.html`
//! - `guild/7` → `guild_2f7.html`
//! - `a_b` → `a_5fb.html`
//!
//! The home page owns `index.html`, so an ID spelled `index` (in any case,
//! for case-insensitive file systems) has its first byte escaped:
//! `index` → `_69ndex.html`. Escaped stems only ever come from that byte, so
//! the mapping stays injective.

use crate::store::EntityId;

/// Template/file stem for a kind: `ResidentialBuilding` → `residential_building`.
pub fn kind_slug(kind: &str) -> String {
    let mut slug = String::with_capacity(kind.len() + 4);
    let mut prev_lower = false;
    for c in kind.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower && !slug.ends_with('_') {
                slug.push('_');
            }
            slug.extend(c.to_lowercase());
            prev_lower = c.is_lowercase() || c.is_numeric();
        } else {
            if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
            prev_lower = false;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Display label for a kind: `ResidentialBuilding` → `Residential Building`.
pub fn kind_label(kind: &str) -> String {
    let mut label = String::with_capacity(kind.len() + 4);
    let mut prev_lower = false;
    for c in kind.chars() {
        if c == '_' || c == '-' {
            if !label.is_empty() && !label.ends_with(' ') {
                label.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            label.push(' ');
        }
        label.push(c);
        prev_lower = c.is_lowercase() || c.is_numeric();
    }
    label.trim_end().to_string()
}

/// Output file stems that belong to the site itself.
const RESERVED_STEMS: &[&str] = &["index"];

/// File stem for an entity page.
pub fn page_stem(id: &EntityId) -> String {
    let reserved = RESERVED_STEMS
        .iter()
        .any(|r| id.as_str().eq_ignore_ascii_case(r));
    let mut stem = String::with_capacity(id.as_str().len() + 2);
    for (i, byte) in id.as_str().bytes().enumerate() {
        let escape = reserved && i == 0;
        if !escape && (byte.is_ascii_alphanumeric() || byte == b'-') {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{byte:02x}"));
        }
    }
    if stem.is_empty() {
        // The empty string is a legal JSON key.
        stem.push('_');
    }
    stem
}

/// File name for an entity page: `<stem>.html`.
pub fn page_filename(id: &EntityId) -> String {
    format!("{}.html", page_stem(id))
}
