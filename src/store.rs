//! Record store: the decoded simulation export.
//!
//! The store is the raw, unresolved form of the dataset. It owns every
//! entity record in input order and an ID → position index; nothing in it
//! knows which fields point at other entities (that is [`crate::resolve`]'s
//! job).
//!
//! ## Accepted Documents
//!
//! Two top-level shapes are accepted:
//!
//! ```text
//! Flat:      { "1": { "Name": { "value": "Alice" }, "Likes": { "target": 2 } }, ... }
//!
//! Envelope:  { "gameobjects": {
//!                "1": { "id": 1, "name": "Alice", "parent": null, "children": [],
//!                       "components": { "Character": { ... } } } },
//!              ...other exporter keys are ignored... }
//! ```
//!
//! The envelope is what the simulation's own exporter writes. The flat form
//! is the minimal mapping of entity ID to components. A document is treated
//! as an envelope when its top level has a `gameobjects` object, so a flat
//! document cannot use `gameobjects` as an entity ID. Run with
//! `RUST_LOG=debug` to see which shape was read.
//!
//! Loading is all-or-nothing: a single malformed entity fails the whole
//! document with an [`InputError`].

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Top-level key the simulation exporter nests its entities under.
const ENVELOPE_KEY: &str = "gameobjects";

#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin}: invalid JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{origin}: unexpected document shape: {reason}")]
    Shape { origin: String, reason: String },
}

/// Identifier of one entity, unique within a dataset.
///
/// Exports use integer IDs in values and their string form as object keys,
/// so IDs are always held in string form: `7` and `"7"` are the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret a JSON value as an ID. Only integers and strings qualify.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self(n.to_string())),
            Value::String(s) => Some(Self(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A named bag of fields attached to an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub fields: Map<String, Value>,
}

/// One entity as it appears in the export.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: EntityId,
    /// Display name carried by the envelope, if any.
    pub name: Option<String>,
    /// Envelope parent ID, `Value::Null` when absent.
    pub parent: Value,
    /// Envelope child IDs.
    pub children: Vec<Value>,
    /// Components in input order.
    pub components: Vec<Component>,
}

impl Record {
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.component(name).is_some()
    }
}

/// Per-entity layout of the exporter envelope.
#[derive(Debug, Deserialize)]
struct ExportedObject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parent: Value,
    #[serde(default)]
    children: Vec<Value>,
    #[serde(default)]
    components: Map<String, Value>,
}

/// The loaded dataset: every record in input order plus an ID index.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    index: HashMap<EntityId, usize>,
}

/// Read and parse an export file.
pub fn load(path: &Path) -> Result<RecordStore, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    RecordStore::parse(&text, &path.display().to_string())
}

impl RecordStore {
    /// Parse a document held in memory.
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        Self::parse(text, "<input>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, InputError> {
        let document: Value = serde_json::from_str(text).map_err(|source| InputError::Json {
            origin: origin.to_string(),
            source,
        })?;
        let shape = |reason: String| InputError::Shape {
            origin: origin.to_string(),
            reason,
        };

        let mut top = match document {
            Value::Object(top) => top,
            other => {
                return Err(shape(format!(
                    "top level must be an object of entities, found {}",
                    json_type_name(&other)
                )));
            }
        };

        let is_envelope = matches!(top.get(ENVELOPE_KEY), Some(Value::Object(_)));
        let records = if is_envelope {
            debug!("{origin}: reading entities from the `{ENVELOPE_KEY}` envelope");
            let objects = match top.remove(ENVELOPE_KEY) {
                Some(Value::Object(objects)) => objects,
                _ => Map::new(),
            };
            parse_envelope(objects)
        } else {
            // A non-object `gameobjects` is just an entity with that ID.
            parse_flat(top)
        };
        let records = records.map_err(shape)?;

        let index = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id.clone(), pos))
            .collect();
        Ok(Self { records, index })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in input order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &EntityId) -> Option<&Record> {
        self.position(id).map(|pos| &self.records[pos])
    }

    /// Input-order position of an ID.
    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.index.get(id).copied()
    }
}

fn parse_flat(top: Map<String, Value>) -> Result<Vec<Record>, String> {
    top.into_iter()
        .map(|(key, value)| {
            let components = match value {
                Value::Object(components) => components,
                other => {
                    return Err(format!(
                        "entity {key} must be an object of components, found {}",
                        json_type_name(&other)
                    ));
                }
            };
            let id = EntityId::new(key);
            let components = parse_components(&id, components)?;
            Ok(Record {
                id,
                name: None,
                parent: Value::Null,
                children: Vec::new(),
                components,
            })
        })
        .collect()
}

fn parse_envelope(objects: Map<String, Value>) -> Result<Vec<Record>, String> {
    objects
        .into_iter()
        .map(|(key, value)| {
            let object: ExportedObject =
                serde_json::from_value(value).map_err(|e| format!("gameobject {key}: {e}"))?;
            let id = EntityId::new(key);
            let components = parse_components(&id, object.components)?;
            Ok(Record {
                id,
                name: object.name,
                parent: object.parent,
                children: object.children,
                components,
            })
        })
        .collect()
}

fn parse_components(id: &EntityId, raw: Map<String, Value>) -> Result<Vec<Component>, String> {
    raw.into_iter()
        .map(|(name, value)| match value {
            Value::Object(fields) => Ok(Component { name, fields }),
            other => Err(format!(
                "entity {id}: component `{name}` must be an object, found {}",
                json_type_name(&other)
            )),
        })
        .collect()
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
