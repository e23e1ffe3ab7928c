//! Page templates.
//!
//! A template is a TOML page layout: which fields of an entity to show, under
//! which headings, in which order. Markup itself is fixed (see
//! [`crate::render`]); templates only choose and arrange data, so a template
//! can never produce malformed HTML or unescaped text.
//!
//! ## Files
//!
//! ```text
//! templates/
//! ├── config.toml                 # Wiki config (see crate::config), not a template
//! ├── character.toml              # Layout for kind `Character`
//! ├── residential_building.toml   # Layout for kind `ResidentialBuilding`
//! ├── fallback.toml               # Layout for entities with no matching template
//! └── index.toml                  # Home page title and intro
//! ```
//!
//! Stock layouts for the simulation's kinds are compiled into the binary.
//! Files in the template directory replace stock layouts of the same name or
//! add new ones. Every file is parsed and validated when the set is loaded,
//! so a broken template stops the run before anything is rendered.
//!
//! ## Layout Format
//!
//! ```toml
//! label = "Character"          # Kind label on entity pages
//! plural = "Characters"        # Group heading on index pages
//!
//! [[sections]]
//! type = "fields"
//! heading = "Details"
//! fields = [
//!     { label = "Age", path = "Character.age" },
//!     { label = "Home", path = "Resident.residence.@parent" },
//! ]
//!
//! [[sections]]
//! type = "list"
//! heading = "Traits"
//! path = "Traits.traits"
//! item = "Trait.display_name"
//! details = [{ path = "Trait.description" }]
//!
//! [[sections]]
//! type = "backlinks"
//! heading = "Mentioned by"
//!
//! [[sections]]
//! type = "components"
//! heading = "Raw data"
//! ```
//!
//! ## Field Paths
//!
//! Dot-separated. The first segment names a component or an attribute
//! (`@id`, `@name`, `@kind`, `@parent`, `@children`). Later segments are
//! object keys or array indices. Landing on a reference and continuing the
//! path continues inside the referenced entity, so
//! `Resident.residence.@parent` is "the building my residence belongs to".
//! `@value` stands for the value under the cursor itself, which is how list
//! details refer to map values (e.g. a skill level).
//!
//! `*` fans out over every element of a list (or value of an object) and
//! evaluates the rest of the path on each, so one path can gather from many
//! entities:
//!
//! ```text
//! District.residences.*.ResidentialBuilding.units.*.Residence.residents
//! ```
//!
//! is every resident of every unit of every building in the district. Such a
//! path has any number of results; see [`FieldPath::lookup_all`].

use crate::naming::kind_slug;
use crate::resolve::{Key, Resolution, Value, ViewRef};
use crate::store::EntityId;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Template name used when an entity's kind has no layout.
pub const FALLBACK: &str = "fallback";
/// Template file stem of the home page.
pub const INDEX: &str = "index";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("cannot read template directory {}: {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid template {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ============================================================================
// Field paths
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attr {
    Id,
    Name,
    Kind,
    Parent,
    Children,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Attr(Attr),
    Member(String),
    Each,
}

/// A dotted path into an entity's data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct FieldPath {
    source: String,
    steps: Vec<Step>,
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        if source.trim().is_empty() {
            return Err("field path is empty".to_string());
        }
        let steps = source
            .split('.')
            .map(|segment| match segment {
                "" => Err(format!("field path `{source}` has an empty segment")),
                "@id" => Ok(Step::Attr(Attr::Id)),
                "@name" => Ok(Step::Attr(Attr::Name)),
                "@kind" => Ok(Step::Attr(Attr::Kind)),
                "@parent" => Ok(Step::Attr(Attr::Parent)),
                "@children" => Ok(Step::Attr(Attr::Children)),
                "@value" => Ok(Step::Attr(Attr::Value)),
                "*" => Ok(Step::Each),
                other if other.starts_with('@') => Err(format!(
                    "field path `{source}`: unknown attribute `{other}` \
                     (expected @id, @name, @kind, @parent, @children or @value)"
                )),
                other => Ok(Step::Member(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { source, steps })
    }
}

impl std::str::FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Where a field path landed.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    /// Nothing there: absent component, field, index, or a dangling hop.
    Missing,
    Entity(ViewRef<'a>),
    /// A reference to an ID the dataset does not contain.
    Unresolved(&'a EntityId),
    Value(&'a Value),
    Text(&'a str),
}

impl<'a> Lookup<'a> {
    /// Wrap a value, replacing references by what they point at.
    pub fn of_value(resolution: &'a Resolution, value: &'a Value) -> Self {
        match value {
            Value::Ref(r) => match resolution.follow(r) {
                Some(view) => Lookup::Entity(view),
                None => Lookup::Unresolved(r.id()),
            },
            other => Lookup::Value(other),
        }
    }

    /// Wrap an object key, replacing reference keys by what they point at.
    pub fn of_key(resolution: &'a Resolution, key: &'a Key) -> Self {
        match key {
            Key::Ref(r) => match resolution.follow(r) {
                Some(view) => Lookup::Entity(view),
                None => Lookup::Unresolved(r.id()),
            },
            Key::Text(s) => Lookup::Text(s),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }
}

impl FieldPath {
    /// Evaluate the path starting from `start`. Never fails: anything that
    /// does not line up yields [`Lookup::Missing`]. A path that fans out
    /// with `*` yields its first result.
    pub fn lookup<'a>(&self, resolution: &'a Resolution, start: Lookup<'a>) -> Lookup<'a> {
        self.lookup_all(resolution, start)
            .into_iter()
            .next()
            .unwrap_or(Lookup::Missing)
    }

    /// Every result of the path, in data order. Branches that come up
    /// missing are dropped, so a path without `*` has at most one result.
    pub fn lookup_all<'a>(&self, resolution: &'a Resolution, start: Lookup<'a>) -> Vec<Lookup<'a>> {
        let mut cursors = vec![start];
        for step in &self.steps {
            cursors = match step {
                Step::Each => cursors
                    .into_iter()
                    .flat_map(|cursor| each(resolution, cursor))
                    .collect(),
                step => cursors
                    .into_iter()
                    .map(|cursor| advance(resolution, cursor, step))
                    .filter(|found| !found.is_missing())
                    .collect(),
            };
        }
        cursors
    }

    /// Every result of the path on an entity.
    pub fn lookup_all_on<'a>(&self, view: ViewRef<'a>) -> Vec<Lookup<'a>> {
        self.lookup_all(view.resolution(), Lookup::Entity(view))
    }

    /// Evaluate the path on an entity.
    pub fn lookup_on<'a>(&self, view: ViewRef<'a>) -> Lookup<'a> {
        self.lookup(view.resolution(), Lookup::Entity(view))
    }
}

/// Elements of a list or values of an object; nothing for anything else.
fn each<'a>(resolution: &'a Resolution, cursor: Lookup<'a>) -> Vec<Lookup<'a>> {
    match cursor {
        Lookup::Value(Value::List(items)) => items
            .iter()
            .map(|item| Lookup::of_value(resolution, item))
            .collect(),
        Lookup::Value(Value::Map(members)) => members
            .iter()
            .map(|(_, value)| Lookup::of_value(resolution, value))
            .collect(),
        _ => Vec::new(),
    }
}

fn advance<'a>(resolution: &'a Resolution, cursor: Lookup<'a>, step: &Step) -> Lookup<'a> {
    match (cursor, step) {
        (cursor, Step::Attr(Attr::Value)) => cursor,
        (Lookup::Entity(view), Step::Attr(attr)) => {
            let view = view.view();
            match attr {
                Attr::Id => Lookup::Text(view.id.as_str()),
                Attr::Name => Lookup::Text(&view.name),
                Attr::Kind => view.kind.as_deref().map_or(Lookup::Missing, Lookup::Text),
                Attr::Parent => Lookup::of_value(resolution, &view.parent),
                Attr::Children => Lookup::Value(&view.children),
                Attr::Value => Lookup::Missing,
            }
        }
        (Lookup::Entity(view), Step::Member(component)) => view
            .view()
            .component(component)
            .map_or(Lookup::Missing, |c| Lookup::Value(&c.data)),
        (Lookup::Value(value @ Value::Map(_)), Step::Member(key)) => value
            .get(key)
            .map_or(Lookup::Missing, |v| Lookup::of_value(resolution, v)),
        (Lookup::Value(Value::List(items)), Step::Member(index)) => index
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .map_or(Lookup::Missing, |v| Lookup::of_value(resolution, v)),
        _ => Lookup::Missing,
    }
}

// ============================================================================
// Layouts
// ============================================================================

/// A labelled field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(default)]
    pub label: String,
    pub path: FieldPath,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldsSection {
    #[serde(default)]
    pub heading: Option<String>,
    pub fields: Vec<FieldSpec>,
}

/// One entry per element of a list, or per member of an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListSection {
    pub heading: String,
    pub path: FieldPath,
    /// Label of each entry, evaluated on the entry (the key, for objects).
    #[serde(default)]
    pub item: Option<FieldPath>,
    /// Extra values per entry, evaluated on the entry (the value, for objects).
    #[serde(default)]
    pub details: Vec<FieldSpec>,
    /// Text shown when there are no entries; defaults to the missing text.
    #[serde(default)]
    pub empty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentsSection {
    #[serde(default)]
    pub heading: Option<String>,
    /// Component names to leave out.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacklinksSection {
    pub heading: String,
    #[serde(default)]
    pub empty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    Fields(FieldsSection),
    List(ListSection),
    Components(ComponentsSection),
    Backlinks(BacklinksSection),
}

/// Layout of one kind's entity pages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageTemplate {
    /// Kind label shown on entity pages; defaults to the kind name.
    #[serde(default)]
    pub label: Option<String>,
    /// Heading of this kind's group on index pages; defaults to the label.
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Home page settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexTemplate {
    /// Page heading; defaults to the site title.
    pub title: Option<String>,
    /// Markdown shown under the heading.
    pub intro: Option<String>,
    /// Also write one `kinds/<kind>.html` listing per kind.
    pub kind_pages: bool,
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self {
            title: None,
            intro: None,
            kind_pages: true,
        }
    }
}

// ============================================================================
// Template set
// ============================================================================

const STOCK_PAGES: &[(&str, &str)] = &[
    ("business", include_str!("../templates/business.toml")),
    ("character", include_str!("../templates/character.toml")),
    ("district", include_str!("../templates/district.toml")),
    ("relationship", include_str!("../templates/relationship.toml")),
    ("residence", include_str!("../templates/residence.toml")),
    (
        "residential_building",
        include_str!("../templates/residential_building.toml"),
    ),
    ("settlement", include_str!("../templates/settlement.toml")),
    ("skill", include_str!("../templates/skill.toml")),
    ("trait", include_str!("../templates/trait.toml")),
];
const STOCK_FALLBACK: &str = include_str!("../templates/fallback.toml");
const STOCK_INDEX: &str = include_str!("../templates/index.toml");

/// All layouts available to the renderer.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pages: BTreeMap<String, PageTemplate>,
    fallback: PageTemplate,
    index: IndexTemplate,
}

impl TemplateSet {
    /// The layouts compiled into the binary.
    pub fn stock() -> Self {
        let stock_path = |name: &str| PathBuf::from(format!("<stock>/{name}.toml"));
        let pages: BTreeMap<String, PageTemplate> = STOCK_PAGES
            .iter()
            .map(|&(name, text)| {
                let page = parse(&stock_path(name), text).expect("stock template must parse");
                (name.to_string(), page)
            })
            .collect();
        Self {
            pages,
            fallback: parse(&stock_path(FALLBACK), STOCK_FALLBACK)
                .expect("stock template must parse"),
            index: parse(&stock_path(INDEX), STOCK_INDEX).expect("stock template must parse"),
        }
    }

    /// Stock layouts overlaid with every `*.toml` in `dir`.
    ///
    /// A missing directory is not an error: the stock layouts are used.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut set = Self::stock();
        if !dir.is_dir() {
            debug!(
                "template directory {} not found, using stock templates",
                dir.display()
            );
            return Ok(set);
        }

        let list_error = |source| TemplateError::List {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_error)? {
            let path = entry.map_err(list_error)?.path();
            let is_toml = path.extension().is_some_and(|e| e == "toml");
            let is_config = path.file_name().is_some_and(|n| n == "config.toml");
            if path.is_file() && is_toml && !is_config {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
                path: path.clone(),
                source,
            })?;
            match stem {
                INDEX => set.index = parse(&path, &text)?,
                FALLBACK => set.fallback = parse(&path, &text)?,
                name => {
                    let replaced = set
                        .pages
                        .insert(name.to_string(), parse(&path, &text)?)
                        .is_some();
                    info!(
                        "template {}: {} `{name}`",
                        path.display(),
                        if replaced { "overrides stock" } else { "adds" }
                    );
                }
            }
        }
        Ok(set)
    }

    pub fn page(&self, name: &str) -> Option<&PageTemplate> {
        if name == FALLBACK {
            return Some(&self.fallback);
        }
        self.pages.get(name)
    }

    pub fn fallback(&self) -> &PageTemplate {
        &self.fallback
    }

    pub fn index(&self) -> &IndexTemplate {
        &self.index
    }

    /// Template name for a kind: its slug when a layout exists, otherwise
    /// [`FALLBACK`].
    pub fn name_for_kind(&self, kind: Option<&str>) -> String {
        kind.map(kind_slug)
            .filter(|slug| self.pages.contains_key(slug))
            .unwrap_or_else(|| FALLBACK.to_string())
    }

    /// Layout names, sorted, excluding the fallback.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T, TemplateError> {
    toml::from_str(text).map_err(|source| TemplateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
