//! Wiki configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the template directory next to the page templates, and every key is
//! optional: user values are merged on top of stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! site_title = "Neighborly Wiki"
//! missing_text = "N/A"            # Placeholder for absent fields
//! name_field = "Name.value"       # Where to find a name when the export has none
//! kind_field = ""                 # Optional explicit kind field, e.g. "Kind.value"
//! status_component = "Active"     # Presence marks an entity active ("" disables)
//! kinds = ["Settlement", "District", "Character", "Business"]
//!
//! [references]
//! District = ["settlement", "residences", "businesses"]
//! Skills = ["@keys"]
//!
//! [colors.light]
//! background = "#fdfcf9"
//! ```
//!
//! ## Kinds
//!
//! An entity's kind picks its page template. `kinds` lists component names
//! in priority order; the first one an entity carries becomes its kind. When
//! `kind_field` is set and the entity has a string at that path, that string
//! wins instead.
//!
//! ## References
//!
//! `[references]` is the declarative table of fields holding entity IDs.
//! See [`crate::refs`] for the pattern syntax. Tables merge per component,
//! so a user file can add components without repeating the stock ones, and
//! `Component = []` switches a stock rule off.
//!
//! Unknown keys are rejected to catch typos early.

use crate::refs::ReferenceTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Wiki configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WikiConfig {
    /// Title shown on the home page and in every page's `<title>`.
    pub site_title: String,
    /// Text rendered wherever a template asks for a field that is absent.
    pub missing_text: String,
    /// Dotted `Component.field` path holding a display name. Used when the
    /// export envelope carries no name. Empty disables.
    pub name_field: String,
    /// Dotted `Component.field` path holding an explicit kind. Empty disables.
    pub kind_field: String,
    /// Component whose presence marks an entity active. Empty disables.
    pub status_component: String,
    /// Kind components in priority order.
    pub kinds: Vec<String>,
    /// Component name → reference field patterns.
    pub references: BTreeMap<String, Vec<String>>,
    /// Page colors.
    pub colors: ColorConfig,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            site_title: "Neighborly Wiki".to_string(),
            missing_text: "N/A".to_string(),
            name_field: "Name.value".to_string(),
            kind_field: String::new(),
            status_component: "Active".to_string(),
            kinds: [
                "Settlement",
                "District",
                "Character",
                "Business",
                "ResidentialBuilding",
                "Residence",
                "Relationship",
                "Trait",
                "Skill",
            ]
            .map(String::from)
            .to_vec(),
            references: default_references(),
            colors: ColorConfig::default(),
        }
    }
}

fn default_references() -> BTreeMap<String, Vec<String>> {
    let rules: &[(&str, &[&str])] = &[
        ("Business", &["district", "owner", "employees"]),
        ("District", &["settlement", "residences", "businesses"]),
        ("FrequentedLocations", &["locations"]),
        ("Likes", &["target"]),
        ("Occupation", &["business"]),
        (
            "Relationships",
            &["outgoing.@keys", "outgoing.*", "incoming.@keys", "incoming.*"],
        ),
        ("Relationship", &["owner", "target"]),
        ("Residence", &["residents", "owners"]),
        ("Resident", &["residence"]),
        ("ResidentialBuilding", &["district", "units"]),
        ("Settlement", &["districts"]),
        ("Skills", &["@keys"]),
        ("Traits", &["traits"]),
    ];
    rules
        .iter()
        .map(|(component, patterns)| {
            (
                component.to_string(),
                patterns.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect()
}

impl WikiConfig {
    /// Validate config values and compile the reference table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site_title must not be empty".into(),
            ));
        }
        for (key, path) in [("name_field", &self.name_field), ("kind_field", &self.kind_field)] {
            if !path.is_empty() && path.split('.').any(str::is_empty) {
                return Err(ConfigError::Validation(format!(
                    "{key} `{path}` has an empty segment"
                )));
            }
        }
        if self.kinds.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "kinds must not contain empty names".into(),
            ));
        }
        self.reference_table()?;
        Ok(())
    }

    /// Compile `[references]` into a [`ReferenceTable`].
    pub fn reference_table(&self) -> Result<ReferenceTable, ConfigError> {
        ReferenceTable::from_rules(
            self.references
                .iter()
                .map(|(component, patterns)| (component.as_str(), patterns.iter().map(String::as_str))),
        )
        .map_err(|e| ConfigError::Validation(format!("references: {e}")))
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text: breadcrumbs, kind labels, placeholders.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    /// Marker color for references whose target is not in the dataset.
    pub unresolved: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fdfcf9".to_string(),
            text: "#1d1b16".to_string(),
            text_muted: "#6b665c".to_string(),
            border: "#e4e0d6".to_string(),
            link: "#2f5d8a".to_string(),
            unresolved: "#a33b2b".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#16150f".to_string(),
            text: "#ece8dd".to_string(),
            text_muted: "#9c978b".to_string(),
            border: "#37342b".to_string(),
            link: "#8fb8e0".to_string(),
            unresolved: "#e08a7a".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// The built-in configuration as a TOML table: the base layer under every
/// `config.toml`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(WikiConfig::default()).expect("default config must serialize")
}

/// Layer `user` over `stock`.
///
/// Tables combine key by key, so a user `[references]` table adds
/// components to the stock table and `[colors.light]` can change a single
/// color. Arrays and scalars replace: a user `kinds` list is the whole list.
pub fn layer_toml(mut stock: toml::Value, user: toml::Value) -> toml::Value {
    layer_into(&mut stock, user);
    stock
}

fn layer_into(stock: &mut toml::Value, user: toml::Value) {
    match (stock, user) {
        (toml::Value::Table(stock), toml::Value::Table(user)) => {
            for (key, value) in user {
                match stock.get_mut(&key) {
                    Some(existing) => layer_into(existing, value),
                    None => {
                        stock.insert(key, value);
                    }
                }
            }
        }
        (stock, user) => *stock = user,
    }
}

/// Read `config.toml` from the template directory and layer it over the
/// stock configuration. Without the file (or the directory) the stock
/// configuration is used as is.
pub fn load_config(dir: &Path) -> Result<WikiConfig, ConfigError> {
    let path = dir.join("config.toml");
    let mut value = stock_defaults_value();
    if path.exists() {
        debug!("reading {}", path.display());
        let user: toml::Value = toml::from_str(&fs::read_to_string(&path)?)?;
        value = layer_toml(value, user);
    }
    let config: WikiConfig = value.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Printed by `--print-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Neighborly Wiki Configuration
# =============================
# Place this file as config.toml in the template directory.
# All settings are optional; values shown are the defaults.
# Unknown keys cause an error.

# Title of the home page; also appended to every page's <title>.
site_title = "Neighborly Wiki"

# Text shown wherever a template asks for a field the entity does not have.
missing_text = "N/A"

# Dotted Component.field path holding a display name. Used for entities the
# export does not name directly. Set to "" to disable.
name_field = "Name.value"

# Dotted Component.field path holding an explicit kind string, e.g.
# "Kind.value". Takes priority over `kinds`. Empty = disabled.
kind_field = ""

# Component whose presence marks an entity active. Inactive entities are
# flagged on their page and in listings. Empty = disabled.
status_component = "Active"

# Kind components in priority order: the first one an entity carries picks
# its page template (ResidentialBuilding -> residential_building.toml).
kinds = [
    "Settlement",
    "District",
    "Character",
    "Business",
    "ResidentialBuilding",
    "Residence",
    "Relationship",
    "Trait",
    "Skill",
]

# ---------------------------------------------------------------------------
# Reference table
# ---------------------------------------------------------------------------
# Which component fields hold entity IDs. Patterns:
#   field            the value (or each element of an array) is an ID
#   a.b              nested field
#   a.*              every value of object `a` / element of array `a`
#   @keys, a.@keys   the keys of the object are IDs (last segment only)
# Tables merge per component; `Component = []` switches a rule off.
[references]
Business = ["district", "owner", "employees"]
District = ["settlement", "residences", "businesses"]
FrequentedLocations = ["locations"]
Likes = ["target"]
Occupation = ["business"]
Relationship = ["owner", "target"]
Relationships = ["outgoing.@keys", "outgoing.*", "incoming.@keys", "incoming.*"]
Residence = ["residents", "owners"]
Resident = ["residence"]
ResidentialBuilding = ["district", "units"]
Settlement = ["districts"]
Skills = ["@keys"]
Traits = ["traits"]

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fdfcf9"
text = "#1d1b16"
text_muted = "#6b665c"    # Breadcrumbs, kind labels, placeholders
border = "#e4e0d6"
link = "#2f5d8a"
unresolved = "#a33b2b"    # References to entities missing from the export

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#16150f"
text = "#ece8dd"
text_muted = "#9c978b"
border = "#37342b"
link = "#8fb8e0"
unresolved = "#e08a7a"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-unresolved: {light_unresolved};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-unresolved: {dark_unresolved};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_unresolved = colors.light.unresolved,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_unresolved = colors.dark.unresolved,
    )
}
