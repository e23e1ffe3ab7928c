//! Entity resolution.
//!
//! Turns the flat [`RecordStore`] into a linked, render-ready model. Every
//! entity gets exactly one [`ResolvedView`]; every field the
//! [`ReferenceTable`] marks as a reference is rewritten into an
//! [`EntityRef`] pointing at the target's view.
//!
//! ## Arena, Not Ownership
//!
//! Views live in one arena owned by [`Resolution`]. A reference holds the
//! target's arena slot, never the target itself, so self references and
//! cycles of any length are plain slot numbers: nothing owns anything else
//! and nothing is copied. Following a reference goes through the arena
//! ([`Resolution::follow`], [`ViewRef::follow`]), which hands back the one
//! shared view for that ID.
//!
//! ## Two Passes
//!
//! 1. Slot assignment: every ID gets its slot (its input position) before any
//!    field is looked at.
//! 2. Rewriting: each record's components are walked once; reference fields
//!    are looked up against the slots from pass 1.
//!
//! Because all slots exist before rewriting starts, one pass over the fields
//! suffices.
//!
//! ## Imperfect Data
//!
//! Resolution never fails. A reference whose target is absent becomes an
//! unresolved [`EntityRef`] (it keeps the ID, has no target). A value in a
//! reference position that cannot be an ID (a float, a boolean, an object) is
//! kept as-is. Both cases are recorded as [`ResolutionWarning`]s and logged.

use crate::config::WikiConfig;
use crate::refs::{Matcher, ReferenceTable};
use crate::store::{EntityId, Record, RecordStore, json_type_name};
use serde_json::{Map, Value as Json};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use tracing::warn;

/// A reference field after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    id: EntityId,
    target: Option<usize>,
}

impl EntityRef {
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// `false` for the unresolved marker: the ID is not in the dataset.
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// Object key after resolution. Keys are references under `@keys` patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Text(String),
    Ref(EntityRef),
}

impl Key {
    /// The key as written in the export.
    pub fn as_str(&self) -> &str {
        match self {
            Key::Text(s) => s,
            Key::Ref(r) => r.id.as_str(),
        }
    }
}

/// A field value after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    /// Object members in input order.
    Map(Vec<(Key, Value)>),
    Ref(EntityRef),
}

impl Value {
    /// Member lookup on a `Map`. Reference keys match their ID.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    fn plain(raw: &Json) -> Self {
        match raw {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.clone()),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::plain).collect()),
            Json::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Key::Text(k.clone()), Value::plain(v)))
                    .collect(),
            ),
        }
    }
}

/// One component of a resolved view. `data` is always a [`Value::Map`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent {
    pub name: String,
    pub data: Value,
}

/// The render-ready form of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedView {
    pub id: EntityId,
    /// Display name: export name, then the configured name field, then a
    /// generated `GameObject <id>` label.
    pub name: String,
    /// Kind component (or explicit kind string), if any.
    pub kind: Option<String>,
    /// Activity status; `None` when no status component is configured.
    pub active: Option<bool>,
    /// `Value::Ref` or `Value::Null`.
    pub parent: Value,
    /// `Value::List` of references.
    pub children: Value,
    pub components: Vec<ResolvedComponent>,
}

impl ResolvedView {
    pub fn component(&self, name: &str) -> Option<&ResolvedComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// A reference field that could not be linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// The target ID is not in the dataset.
    Dangling {
        entity: EntityId,
        field: String,
        target: EntityId,
    },
    /// The value in a reference position is not an integer or string.
    NotAnId {
        entity: EntityId,
        field: String,
        found: &'static str,
    },
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dangling {
                entity,
                field,
                target,
            } => write!(
                f,
                "entity {entity}: {field} refers to entity {target}, which is not in the dataset"
            ),
            Self::NotAnId {
                entity,
                field,
                found,
            } => write!(
                f,
                "entity {entity}: {field} should hold an entity ID but holds {found}; keeping the raw value"
            ),
        }
    }
}

/// All resolved views of a dataset, in input order.
#[derive(Debug, Default)]
pub struct Resolution {
    views: Vec<ResolvedView>,
    index: HashMap<EntityId, usize>,
    backlinks: Vec<Vec<usize>>,
    warnings: Vec<ResolutionWarning>,
}

impl Resolution {
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Views in input order.
    pub fn views(&self) -> impl Iterator<Item = ViewRef<'_>> {
        (0..self.views.len()).map(|slot| ViewRef {
            resolution: self,
            slot,
        })
    }

    pub fn get(&self, id: &EntityId) -> Option<ViewRef<'_>> {
        self.index.get(id).map(|&slot| ViewRef {
            resolution: self,
            slot,
        })
    }

    /// The view a reference points at, or `None` for the unresolved marker.
    pub fn follow(&self, reference: &EntityRef) -> Option<ViewRef<'_>> {
        reference.target.map(|slot| ViewRef {
            resolution: self,
            slot,
        })
    }

    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }
}

/// A view together with the arena it lives in, so references can be followed.
#[derive(Debug, Clone, Copy)]
pub struct ViewRef<'a> {
    resolution: &'a Resolution,
    slot: usize,
}

impl<'a> ViewRef<'a> {
    pub fn view(&self) -> &'a ResolvedView {
        &self.resolution.views[self.slot]
    }

    pub fn resolution(&self) -> &'a Resolution {
        self.resolution
    }

    pub fn follow(&self, reference: &EntityRef) -> Option<ViewRef<'a>> {
        self.resolution.follow(reference)
    }

    /// Entities whose reference fields point at this one, in input order.
    pub fn backlinks(&self) -> impl Iterator<Item = ViewRef<'a>> + 'a {
        let resolution = self.resolution;
        resolution.backlinks[self.slot]
            .iter()
            .map(move |&slot| ViewRef { resolution, slot })
    }

    /// Whether both handles point at the same view instance.
    pub fn same_as(&self, other: &ViewRef<'_>) -> bool {
        std::ptr::eq(self.view(), other.view())
    }
}

impl Deref for ViewRef<'_> {
    type Target = ResolvedView;

    fn deref(&self) -> &ResolvedView {
        self.view()
    }
}

/// Resolve every record in the store.
pub fn resolve(store: &RecordStore, table: &ReferenceTable, config: &WikiConfig) -> Resolution {
    // Pass 1: slots. A record's slot is its input position.
    let index: HashMap<EntityId, usize> = store
        .records()
        .iter()
        .enumerate()
        .map(|(slot, record)| (record.id.clone(), slot))
        .collect();

    // Pass 2: rewrite reference fields against the slots.
    let mut linker = Linker {
        index: &index,
        backlinks: vec![Vec::new(); store.len()],
        warnings: Vec::new(),
        from: 0,
    };
    let views: Vec<ResolvedView> = store
        .records()
        .iter()
        .enumerate()
        .map(|(slot, record)| {
            linker.from = slot;
            linker.view(record, table, config)
        })
        .collect();

    let Linker {
        backlinks,
        warnings,
        ..
    } = linker;
    Resolution {
        views,
        index,
        backlinks,
        warnings,
    }
}

/// Pass-2 state for the record currently being rewritten.
struct Linker<'s> {
    index: &'s HashMap<EntityId, usize>,
    backlinks: Vec<Vec<usize>>,
    warnings: Vec<ResolutionWarning>,
    from: usize,
}

impl Linker<'_> {
    fn view(&mut self, record: &Record, table: &ReferenceTable, config: &WikiConfig) -> ResolvedView {
        let id = &record.id;

        let parent = match &record.parent {
            Json::Null => Value::Null,
            raw => self.reference(id, raw, "@parent"),
        };
        let children = Value::List(
            record
                .children
                .iter()
                .enumerate()
                .map(|(i, raw)| self.reference(id, raw, &format!("@children[{i}]")))
                .collect(),
        );

        let components = record
            .components
            .iter()
            .map(|component| {
                let matchers = table.matchers_for(&component.name);
                ResolvedComponent {
                    name: component.name.clone(),
                    data: self.convert_object(id, &component.fields, &matchers, &component.name),
                }
            })
            .collect();

        ResolvedView {
            id: id.clone(),
            name: display_name(record, config),
            kind: entity_kind(record, config),
            active: (!config.status_component.is_empty())
                .then(|| record.has_component(&config.status_component)),
            parent,
            children,
            components,
        }
    }

    fn convert(&mut self, id: &EntityId, raw: &Json, matchers: &[Matcher<'_>], path: &str) -> Value {
        if matchers.iter().any(Matcher::is_complete) {
            return match raw {
                Json::Array(items) => Value::List(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| self.reference(id, item, &format!("{path}[{i}]")))
                        .collect(),
                ),
                other => self.reference(id, other, path),
            };
        }

        match raw {
            Json::Object(map) => self.convert_object(id, map, matchers, path),
            Json::Array(items) => {
                let child: Vec<Matcher<'_>> = matchers.iter().filter_map(Matcher::element).collect();
                Value::List(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| self.convert(id, item, &child, &format!("{path}[{i}]")))
                        .collect(),
                )
            }
            other => Value::plain(other),
        }
    }

    fn convert_object(
        &mut self,
        id: &EntityId,
        map: &Map<String, Json>,
        matchers: &[Matcher<'_>],
        path: &str,
    ) -> Value {
        let keys_are_refs = matchers.iter().any(Matcher::wants_keys);
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let child_path = format!("{path}.{key}");
            let resolved_key = if keys_are_refs {
                Key::Ref(self.link(id, EntityId::new(key.clone()), &child_path))
            } else {
                Key::Text(key.clone())
            };
            let child: Vec<Matcher<'_>> = matchers.iter().filter_map(|m| m.member(key)).collect();
            entries.push((resolved_key, self.convert(id, value, &child, &child_path)));
        }
        Value::Map(entries)
    }

    /// A single value in reference position.
    fn reference(&mut self, id: &EntityId, raw: &Json, path: &str) -> Value {
        if raw.is_null() {
            return Value::Null;
        }
        match EntityId::from_json(raw) {
            Some(target) => Value::Ref(self.link(id, target, path)),
            None => {
                let warning = ResolutionWarning::NotAnId {
                    entity: id.clone(),
                    field: path.to_string(),
                    found: json_type_name(raw),
                };
                warn!("{warning}");
                self.warnings.push(warning);
                Value::plain(raw)
            }
        }
    }

    fn link(&mut self, id: &EntityId, target: EntityId, path: &str) -> EntityRef {
        let slot = self.index.get(&target).copied();
        match slot {
            Some(slot) => {
                let inbound = &mut self.backlinks[slot];
                if slot != self.from && inbound.last() != Some(&self.from) {
                    inbound.push(self.from);
                }
            }
            None => {
                let warning = ResolutionWarning::Dangling {
                    entity: id.clone(),
                    field: path.to_string(),
                    target: target.clone(),
                };
                warn!("{warning}");
                self.warnings.push(warning);
            }
        }
        EntityRef { id: target, target: slot }
    }
}

/// Follow a dotted `Component.field...` path through a raw record.
fn lookup_raw<'r>(record: &'r Record, path: &str) -> Option<&'r Json> {
    let mut segments = path.split('.');
    let component = record.component(segments.next()?)?;
    let mut current = component.fields.get(segments.next()?)?;
    for segment in segments {
        current = current.get(segment)?;
    }
    Some(current)
}

fn display_name(record: &Record, config: &WikiConfig) -> String {
    if let Some(name) = record.name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    if !config.name_field.is_empty() {
        match lookup_raw(record, &config.name_field) {
            Some(Json::String(s)) if !s.trim().is_empty() => return s.clone(),
            Some(Json::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    format!("GameObject {}", record.id)
}

fn entity_kind(record: &Record, config: &WikiConfig) -> Option<String> {
    if !config.kind_field.is_empty() {
        if let Some(Json::String(kind)) = lookup_raw(record, &config.kind_field) {
            if !kind.trim().is_empty() {
                return Some(kind.clone());
            }
        }
    }
    config
        .kinds
        .iter()
        .find(|kind| record.has_component(kind))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(references: &[(&str, &[&str])]) -> WikiConfig {
        WikiConfig {
            references: references
                .iter()
                .map(|(c, ps)| (c.to_string(), ps.iter().map(|p| p.to_string()).collect()))
                .collect(),
            ..WikiConfig::default()
        }
    }

    fn resolve_with(json: &str, references: &[(&str, &[&str])]) -> Resolution {
        let config = config_with(references);
        let store = RecordStore::from_json_str(json).unwrap();
        resolve(&store, &config.reference_table().unwrap(), &config)
    }

    fn target<'a>(view: ViewRef<'a>, component: &str, field: &str) -> Option<ViewRef<'a>> {
        match view.component(component)?.data.get(field)? {
            Value::Ref(r) => view.follow(r),
            _ => None,
        }
    }

    const ALICE_BOB: &str = r#"{
        "1": {"Name": {"value": "Alice"}, "Likes": {"target": 2}},
        "2": {"Name": {"value": "Bob"}}
    }"#;

    #[test]
    fn one_view_per_entity_in_input_order() {
        let resolution = resolve_with(ALICE_BOB, &[("Likes", &["target"])]);
        assert_eq!(resolution.len(), 2);
        let names: Vec<&str> = resolution.views().map(|v| v.view().name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert!(resolution.warnings().is_empty());
    }

    #[test]
    fn reference_resolves_to_target_view() {
        let resolution = resolve_with(ALICE_BOB, &[("Likes", &["target"])]);
        let alice = resolution.get(&EntityId::from("1")).unwrap();
        let bob = target(alice, "Likes", "target").unwrap();
        assert_eq!(bob.name, "Bob");
    }

    #[test]
    fn unlisted_fields_stay_plain_numbers() {
        let resolution = resolve_with(ALICE_BOB, &[]);
        let alice = resolution.get(&EntityId::from("1")).unwrap();
        let value = alice.component("Likes").unwrap().data.get("target").unwrap();
        assert!(matches!(value, Value::Number(_)));
    }

    #[test]
    fn references_to_same_id_share_one_view() {
        let resolution = resolve_with(
            r#"{
                "1": {"A": {"x": 3}, "B": {"y": "3"}},
                "3": {"Name": {"value": "Shared"}}
            }"#,
            &[("A", &["x"]), ("B", &["y"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let via_a = target(one, "A", "x").unwrap();
        let via_b = target(one, "B", "y").unwrap();
        assert!(via_a.same_as(&via_b));
        assert!(via_a.same_as(&resolution.get(&EntityId::from("3")).unwrap()));
    }

    #[test]
    fn self_reference_returns_same_view() {
        let resolution = resolve_with(r#"{"5": {"Mirror": {"me": 5}}}"#, &[("Mirror", &["me"])]);
        let five = resolution.get(&EntityId::from("5")).unwrap();
        let followed = target(five, "Mirror", "me").unwrap();
        assert!(followed.same_as(&five));
        // Self references are not listed as backlinks.
        assert_eq!(five.backlinks().count(), 0);
    }

    #[test]
    fn cycles_resolve_without_recursion() {
        let resolution = resolve_with(
            r#"{"a": {"Link": {"to": "b"}}, "b": {"Link": {"to": "a"}}}"#,
            &[("Link", &["to"])],
        );
        let a = resolution.get(&EntityId::from("a")).unwrap();
        let b = target(a, "Link", "to").unwrap();
        let back = target(b, "Link", "to").unwrap();
        assert!(back.same_as(&a));
    }

    #[test]
    fn dangling_reference_is_unresolved_marker_with_warning() {
        let resolution = resolve_with(
            r#"{"1": {"Likes": {"target": 99}}}"#,
            &[("Likes", &["target"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let Value::Ref(r) = one.component("Likes").unwrap().data.get("target").unwrap() else {
            panic!("expected a reference");
        };
        assert!(!r.is_resolved());
        assert_eq!(r.id().as_str(), "99");
        assert!(resolution.follow(r).is_none());

        assert_eq!(
            resolution.warnings(),
            &[ResolutionWarning::Dangling {
                entity: EntityId::from("1"),
                field: "Likes.target".to_string(),
                target: EntityId::from("99"),
            }]
        );
    }

    #[test]
    fn non_id_value_is_kept_with_warning() {
        let resolution = resolve_with(
            r#"{"1": {"Likes": {"target": 2.5}}}"#,
            &[("Likes", &["target"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let value = one.component("Likes").unwrap().data.get("target").unwrap();
        assert!(matches!(value, Value::Number(n) if n.as_f64() == Some(2.5)));
        assert!(matches!(
            resolution.warnings(),
            [ResolutionWarning::NotAnId { found: "a number", .. }]
        ));
    }

    #[test]
    fn null_reference_stays_null_without_warning() {
        let resolution = resolve_with(
            r#"{"1": {"Occupation": {"business": null}}}"#,
            &[("Occupation", &["business"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let value = one.component("Occupation").unwrap().data.get("business").unwrap();
        assert_eq!(value, &Value::Null);
        assert!(resolution.warnings().is_empty());
    }

    #[test]
    fn array_field_resolves_each_element() {
        let resolution = resolve_with(
            r#"{
                "1": {"Traits": {"traits": [2, 3, 404]}},
                "2": {"Trait": {"display_name": "Kind"}},
                "3": {"Trait": {"display_name": "Shy"}}
            }"#,
            &[("Traits", &["traits"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let Value::List(items) = one.component("Traits").unwrap().data.get("traits").unwrap() else {
            panic!("expected a list");
        };
        let resolved: Vec<bool> = items
            .iter()
            .map(|v| matches!(v, Value::Ref(r) if r.is_resolved()))
            .collect();
        assert_eq!(resolved, vec![true, true, false]);
        assert_eq!(resolution.warnings().len(), 1);
        assert!(resolution.warnings()[0].to_string().contains("Traits.traits[2]"));
    }

    #[test]
    fn keys_pattern_turns_object_keys_into_references() {
        let resolution = resolve_with(
            r#"{
                "1": {"Skills": {"7": 0.5}},
                "7": {"Skill": {"display_name": "Cooking"}}
            }"#,
            &[("Skills", &["@keys"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let Value::Map(entries) = &one.component("Skills").unwrap().data else {
            panic!("expected a map");
        };
        let (key, level) = &entries[0];
        let Key::Ref(r) = key else {
            panic!("expected a reference key");
        };
        assert_eq!(resolution.follow(r).unwrap().id.as_str(), "7");
        assert!(matches!(level, Value::Number(_)));
    }

    #[test]
    fn nested_keys_and_values_patterns() {
        let resolution = resolve_with(
            r#"{
                "1": {"Relationships": {"outgoing": {"2": 10}}},
                "2": {"Name": {"value": "Bob"}},
                "10": {"Relationship": {"owner": 1, "target": 2}}
            }"#,
            &[
                ("Relationships", &["outgoing.@keys", "outgoing.*"]),
                ("Relationship", &["owner", "target"]),
            ],
        );
        assert!(resolution.warnings().is_empty());
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let outgoing = one.component("Relationships").unwrap().data.get("outgoing").unwrap();
        let Value::Map(entries) = outgoing else {
            panic!("expected a map");
        };
        let (Key::Ref(target_ref), Value::Ref(rel_ref)) = &entries[0] else {
            panic!("expected key and value references");
        };
        assert_eq!(resolution.follow(target_ref).unwrap().name, "Bob");
        let relationship = resolution.follow(rel_ref).unwrap();
        assert!(target(relationship, "Relationship", "owner").unwrap().same_as(&one));
    }

    #[test]
    fn wildcard_over_list_of_objects() {
        let resolution = resolve_with(
            r#"{
                "1": {"Family": {"members": [{"who": 2, "role": "sister"}]}},
                "2": {}
            }"#,
            &[("Family", &["members.*.who"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let Value::List(members) = one.component("Family").unwrap().data.get("members").unwrap() else {
            panic!("expected a list");
        };
        assert!(matches!(members[0].get("who"), Some(Value::Ref(r)) if r.is_resolved()));
        assert!(matches!(members[0].get("role"), Some(Value::String(_))));
    }

    #[test]
    fn backlinks_list_referrers_once_in_input_order() {
        let resolution = resolve_with(
            r#"{
                "3": {"Likes": {"target": 1, "also": 1}},
                "1": {},
                "2": {"Likes": {"target": 1}}
            }"#,
            &[("Likes", &["target", "also"])],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        let ids: Vec<&str> = one.backlinks().map(|v| v.view().id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn envelope_parent_and_children_are_references() {
        let resolution = resolve_with(
            r#"{"gameobjects": {
                "10": {"name": "Oak Street", "children": [11, 12], "components": {}},
                "11": {"name": "Unit 1", "parent": 10, "components": {}}
            }}"#,
            &[],
        );
        let unit = resolution.get(&EntityId::from("11")).unwrap();
        let Value::Ref(parent) = &unit.parent else {
            panic!("expected parent reference");
        };
        assert_eq!(resolution.follow(parent).unwrap().name, "Oak Street");

        let building = resolution.get(&EntityId::from("10")).unwrap();
        assert_eq!(building.parent, Value::Null);
        let Value::List(children) = &building.children else {
            panic!("expected children list");
        };
        assert_eq!(children.len(), 2);
        // Child 12 is not exported.
        assert_eq!(resolution.warnings().len(), 1);
    }

    #[test]
    fn kind_follows_configured_priority() {
        let resolution = resolve_with(
            r#"{"1": {"Business": {}, "District": {}}, "2": {"Widget": {}}}"#,
            &[],
        );
        let one = resolution.get(&EntityId::from("1")).unwrap();
        assert_eq!(one.kind.as_deref(), Some("District"));
        let two = resolution.get(&EntityId::from("2")).unwrap();
        assert_eq!(two.kind, None);
    }

    #[test]
    fn kind_field_overrides_kind_components() {
        let config = WikiConfig {
            kind_field: "Kind.value".to_string(),
            ..WikiConfig::default()
        };
        let store = RecordStore::from_json_str(
            r#"{"1": {"Kind": {"value": "Monument"}, "District": {}}, "2": {"District": {}}}"#,
        )
        .unwrap();
        let resolution = resolve(&store, &config.reference_table().unwrap(), &config);
        let kinds: Vec<Option<&str>> = resolution.views().map(|v| v.view().kind.as_deref()).collect();
        assert_eq!(kinds, vec![Some("Monument"), Some("District")]);
    }

    #[test]
    fn display_name_fallbacks() {
        let resolution = resolve_with(
            r#"{"gameobjects": {
                "1": {"name": "Envelope", "components": {"Name": {"value": "Field"}}},
                "2": {"components": {"Name": {"value": "Field"}}},
                "3": {"name": "", "components": {}}
            }}"#,
            &[],
        );
        let names: Vec<&str> = resolution.views().map(|v| v.view().name.as_str()).collect();
        assert_eq!(names, vec!["Envelope", "Field", "GameObject 3"]);
    }

    #[test]
    fn active_status_from_status_component() {
        let resolution = resolve_with(r#"{"1": {"Active": {}}, "2": {}}"#, &[]);
        let active: Vec<Option<bool>> = resolution.views().map(|v| v.view().active).collect();
        assert_eq!(active, vec![Some(true), Some(false)]);

        let config = WikiConfig {
            status_component: String::new(),
            ..WikiConfig::default()
        };
        let store = RecordStore::from_json_str(r#"{"1": {"Active": {}}}"#).unwrap();
        let resolution = resolve(&store, &ReferenceTable::new(), &config);
        assert_eq!(resolution.views().next().unwrap().active, None);
    }

    #[test]
    fn resolution_does_not_touch_the_store() {
        let store = RecordStore::from_json_str(ALICE_BOB).unwrap();
        let before = store.records().to_vec();
        let config = config_with(&[("Likes", &["target"])]);
        let _ = resolve(&store, &config.reference_table().unwrap(), &config);
        assert_eq!(store.records(), before.as_slice());
    }
}
