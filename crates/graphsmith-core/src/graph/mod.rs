//! Knowledge graph data model
//!
//! A [`KnowledgeGraph`] is used in two roles with the same shape: as the
//! *fragment* produced by one chunk's extraction, and as the *merged graph*
//! produced by [`merge_graphs`] with entity-name and relationship-triple
//! uniqueness enforced.

mod merge;

pub use merge::merge_graphs;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A property value attached to an entity or relationship.
///
/// Property bags are a closed set of scalar variants rather than arbitrary
/// JSON, so storage serialization stays well-defined. Values outside this
/// set (objects, nulls, mixed arrays) are dropped during extraction.
///
/// Variant order matters: serde tries untagged variants top to bottom, so
/// booleans must come before numbers and numbers before strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag
    Bool(bool),
    /// Numeric value (integers are widened to f64)
    Number(f64),
    /// Text value
    Text(String),
    /// Numeric vector, e.g. a stored embedding
    Vector(Vec<f64>),
}

impl PropertyValue {
    /// Convert a JSON value into a property value, if it fits the closed set.
    ///
    /// Returns `None` for JSON objects, nulls, and arrays containing
    /// non-numeric elements.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(PropertyValue::Number),
            serde_json::Value::String(s) => Some(PropertyValue::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| item.as_f64())
                .collect::<Option<Vec<f64>>>()
                .map(PropertyValue::Vector),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Ordered property bag.
///
/// A `BTreeMap` keeps key order deterministic so merged graphs serialize
/// byte-for-byte identically for the same input.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Mapping from entity name to its embedding vector, produced after merge
/// and handed to storage alongside the merged graph.
pub type EmbeddingMap = HashMap<String, Vec<f32>>;

/// A node in the knowledge graph.
///
/// Within one merged graph there is at most one entity per distinct `name`
/// (case-sensitive, exact match).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique name within a graph
    pub name: String,
    /// Category label, e.g. "Person", "Organization", "Concept"
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Additional properties
    #[serde(default)]
    pub properties: Properties,
    /// Optional embedding vector, attached after merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Entity {
    /// Create an entity with no properties or embedding.
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            properties: Properties::new(),
            embedding: None,
        }
    }

    /// Set a property, replacing any existing value for the key.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A directed edge between two entities, referenced by name.
///
/// Endpoints are not required to exist in the same fragment, or at all:
/// merge happens after extraction, so an edge may reference an entity
/// extracted from a different chunk, and dangling references are tolerated
/// (the storage layer creates placeholder nodes for them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity name
    pub source: String,
    /// Target entity name
    pub target: String,
    /// Relationship type, e.g. "works_for", "located_in"
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Additional properties
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    /// Create a relationship with no properties.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rel_type: rel_type.into(),
            properties: Properties::new(),
        }
    }

    /// Set a property, replacing any existing value for the key.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A graph of entities and relationships.
///
/// Produced per chunk by extraction (a *fragment*, ephemeral) and once per
/// ingestion run by [`merge_graphs`] (the merged graph, handed to storage).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    /// Entities in first-seen order
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Relationships in fragment order
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl KnowledgeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the graph contains no entities and no relationships.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}
