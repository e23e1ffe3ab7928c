//! Reference table: which component fields hold entity IDs.
//!
//! The export does not mark references; an integer is just an integer. The
//! table makes the convention explicit so that nothing is guessed from field
//! names or values. It maps a component name to a list of field patterns:
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `district` | the value of `district`; if it is an array, each element |
//! | `stats.owner` | a nested field |
//! | `outgoing.*` | every value of the `outgoing` object (or element of an array) |
//! | `@keys` | the keys of the component object itself |
//! | `outgoing.@keys` | the keys of the `outgoing` object |
//!
//! `@keys` may only appear as the last segment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid reference pattern `{pattern}`: {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Any,
    Keys,
}

/// One compiled field pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePattern {
    source: String,
    segments: Vec<Segment>,
}

impl FromStr for ReferencePattern {
    type Err = PatternError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let fail = |reason| PatternError {
            pattern: pattern.to_string(),
            reason,
        };
        if pattern.trim().is_empty() {
            return Err(fail("pattern is empty"));
        }

        let raw: Vec<&str> = pattern.split('.').collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (i, part) in raw.iter().enumerate() {
            let segment = match *part {
                "" => return Err(fail("empty segment")),
                "*" => Segment::Any,
                "@keys" if i + 1 == raw.len() => Segment::Keys,
                "@keys" => return Err(fail("`@keys` must be the last segment")),
                other if other.starts_with('@') => {
                    return Err(fail("unknown `@` segment (only `@keys` is supported)"));
                }
                other => Segment::Field(other.to_string()),
            };
            segments.push(segment);
        }
        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }
}

impl fmt::Display for ReferencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Position of a pattern while walking a component's JSON tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Matcher<'a> {
    segments: &'a [Segment],
}

impl<'a> Matcher<'a> {
    /// The value under the cursor is itself a reference.
    pub(crate) fn is_complete(&self) -> bool {
        self.segments.is_empty()
    }

    /// The keys of the object under the cursor are references.
    pub(crate) fn wants_keys(&self) -> bool {
        matches!(self.segments, [Segment::Keys])
    }

    /// Advance into the object member named `key`.
    pub(crate) fn member(&self, key: &str) -> Option<Self> {
        match self.segments.split_first() {
            Some((Segment::Field(name), rest)) if name == key => Some(Self { segments: rest }),
            Some((Segment::Any, rest)) => Some(Self { segments: rest }),
            _ => None,
        }
    }

    /// Advance into an array element.
    pub(crate) fn element(&self) -> Option<Self> {
        match self.segments.split_first() {
            Some((Segment::Any, rest)) => Some(Self { segments: rest }),
            _ => None,
        }
    }
}

/// Component name → reference patterns.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rules: HashMap<String, Vec<ReferencePattern>>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a table from `(component, [pattern, ...])` pairs.
    pub fn from_rules<'a, I, P>(rules: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (&'a str, P)>,
        P: IntoIterator<Item = &'a str>,
    {
        let mut table = Self::new();
        for (component, patterns) in rules {
            for pattern in patterns {
                table.insert(component, pattern.parse()?);
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, component: &str, pattern: ReferencePattern) {
        self.rules
            .entry(component.to_string())
            .or_default()
            .push(pattern);
    }

    pub fn patterns_for(&self, component: &str) -> &[ReferencePattern] {
        self.rules
            .get(component)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.values().all(Vec::is_empty)
    }

    /// Fresh matchers for the root of a component object.
    pub(crate) fn matchers_for(&self, component: &str) -> Vec<Matcher<'_>> {
        self.patterns_for(component)
            .iter()
            .map(|p| Matcher {
                segments: &p.segments,
            })
            .collect()
    }
}
