// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Mapping descriptors for domain element types
//!
//! This module provides:
//! - Element kinds and property cardinality
//! - Per-type descriptors (label, property table, reconciler)
//! - A registry that resolves backend labels to descriptors
//! - The property codec that moves values between domain and wire form

pub mod codec;
pub mod reconcile;

pub use codec::{DataType, PropertyCodec};
pub use reconcile::{Reconciler, StandardReconciler};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Kind of graph element a domain type maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Vertex,
    Edge,
    /// Individual property value attached to a vertex; never saved on its own
    VertexProperty,
}

impl ElementKind {
    /// Label used by the generic fallback type of this kind
    pub fn default_label(self) -> &'static str {
        match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::VertexProperty => "vertex_property",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::VertexProperty => "vertex property",
        };
        write!(f, "{}", name)
    }
}

/// Multiplicity policy for a vertex property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    List,
    Set,
}

/// Declared property: backend name, value type and optional cardinality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    /// Property name on the backend
    pub db_name: String,
    /// Coercion applied on the way in and out
    pub data_type: DataType,
    /// Set for vertex properties that hold multiple values or metadata
    pub cardinality: Option<Cardinality>,
}

/// Per-type mapping descriptor
#[derive(Clone)]
pub struct Mapping {
    kind: ElementKind,
    label: String,
    properties: BTreeMap<String, PropertyDef>,
    reconciler: Arc<dyn Reconciler>,
    generic: bool,
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("properties", &self.properties)
            .field("generic", &self.generic)
            .finish()
    }
}

impl Mapping {
    fn new(kind: ElementKind, label: impl Into<String>, generic: bool) -> Self {
        Self {
            kind,
            label: label.into(),
            properties: BTreeMap::new(),
            reconciler: Arc::new(StandardReconciler),
            generic,
        }
    }

    /// Descriptor for a vertex type
    pub fn vertex(label: impl Into<String>) -> Self {
        Self::new(ElementKind::Vertex, label, false)
    }

    /// Descriptor for an edge type
    pub fn edge(label: impl Into<String>) -> Self {
        Self::new(ElementKind::Edge, label, false)
    }

    /// Descriptor for a free-standing vertex property type
    pub fn vertex_property(label: impl Into<String>) -> Self {
        Self::new(ElementKind::VertexProperty, label, false)
    }

    /// Fallback descriptor used when a backend label has no registered type
    pub fn generic(kind: ElementKind) -> Self {
        Self::new(kind, kind.default_label(), true)
    }

    /// Declare a property stored under the same name on the backend
    pub fn with_property(self, attr: impl Into<String>, data_type: DataType) -> Self {
        let attr = attr.into();
        let db_name = attr.clone();
        self.with_property_named(attr, db_name, data_type)
    }

    /// Declare a property stored under a different backend name
    pub fn with_property_named(
        mut self,
        attr: impl Into<String>,
        db_name: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        self.properties.insert(
            attr.into(),
            PropertyDef {
                db_name: db_name.into(),
                data_type,
                cardinality: None,
            },
        );
        self
    }

    /// Declare a multi-valued vertex property
    pub fn with_multi_property(
        mut self,
        attr: impl Into<String>,
        data_type: DataType,
        cardinality: Cardinality,
    ) -> Self {
        let attr = attr.into();
        self.properties.insert(
            attr.clone(),
            PropertyDef {
                db_name: attr,
                data_type,
                cardinality: Some(cardinality),
            },
        );
        self
    }

    /// Replace the reconciliation function
    pub fn with_reconciler(mut self, reconciler: Arc<dyn Reconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// True for the registry's fallback descriptors
    pub fn is_generic(&self) -> bool {
        self.generic
    }

    /// Declared property for a domain attribute
    pub fn property(&self, attr: &str) -> Option<&PropertyDef> {
        self.properties.get(attr)
    }

    /// Domain attribute declared for a backend property name
    pub fn attribute_for(&self, db_name: &str) -> Option<(&str, &PropertyDef)> {
        self.properties
            .iter()
            .find(|(_, def)| def.db_name == db_name)
            .map(|(attr, def)| (attr.as_str(), def))
    }

    /// Declared properties in attribute-name order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyDef)> {
        self.properties.iter().map(|(attr, def)| (attr.as_str(), def))
    }

    pub fn reconciler(&self) -> Arc<dyn Reconciler> {
        Arc::clone(&self.reconciler)
    }
}

/// Registry of mapping descriptors keyed by (kind, label)
#[derive(Debug, Clone)]
pub struct Registry {
    types: HashMap<(ElementKind, String), Arc<Mapping>>,
    generic_vertex: Arc<Mapping>,
    generic_edge: Arc<Mapping>,
    generic_vertex_property: Arc<Mapping>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding only the generic fallbacks
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            generic_vertex: Arc::new(Mapping::generic(ElementKind::Vertex)),
            generic_edge: Arc::new(Mapping::generic(ElementKind::Edge)),
            generic_vertex_property: Arc::new(Mapping::generic(ElementKind::VertexProperty)),
        }
    }

    /// Register a descriptor; a later registration for the same label wins
    pub fn register(&mut self, mapping: Mapping) -> Arc<Mapping> {
        let mapping = Arc::new(mapping);
        let key = (mapping.kind(), mapping.label().to_string());
        if self.types.insert(key, Arc::clone(&mapping)).is_some() {
            log::debug!(
                "Replaced {} mapping for label '{}'",
                mapping.kind(),
                mapping.label()
            );
        }
        mapping
    }

    /// Registered descriptor for a label, if any
    pub fn get(&self, kind: ElementKind, label: &str) -> Option<Arc<Mapping>> {
        self.types.get(&(kind, label.to_string())).cloned()
    }

    /// Registered descriptor for a label, falling back to the generic type
    pub fn lookup_by_label(&self, kind: ElementKind, label: &str) -> Arc<Mapping> {
        self.get(kind, label).unwrap_or_else(|| self.generic(kind))
    }

    /// Generic fallback descriptor for a kind
    pub fn generic(&self, kind: ElementKind) -> Arc<Mapping> {
        match kind {
            ElementKind::Vertex => Arc::clone(&self.generic_vertex),
            ElementKind::Edge => Arc::clone(&self.generic_edge),
            ElementKind::VertexProperty => Arc::clone(&self.generic_vertex_property),
        }
    }

    /// Number of registered (non-generic) types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Mapping {
        Mapping::vertex("person")
            .with_property("name", DataType::String)
            .with_property_named("age", "person_age", DataType::Integer)
            .with_multi_property("nicknames", DataType::String, Cardinality::List)
    }

    #[test]
    fn test_property_table() {
        let mapping = person();
        assert_eq!(mapping.kind(), ElementKind::Vertex);
        assert_eq!(mapping.label(), "person");
        assert_eq!(mapping.property("age").unwrap().db_name, "person_age");
        assert_eq!(
            mapping.property("nicknames").unwrap().cardinality,
            Some(Cardinality::List)
        );
        assert!(mapping.property("missing").is_none());
    }

    #[test]
    fn test_attribute_for_db_name() {
        let mapping = person();
        let (attr, def) = mapping.attribute_for("person_age").unwrap();
        assert_eq!(attr, "age");
        assert_eq!(def.data_type, DataType::Integer);
        assert!(mapping.attribute_for("age").is_none());
    }

    #[test]
    fn test_registry_lookup_with_fallback() {
        let mut registry = Registry::new();
        registry.register(person());
        registry.register(Mapping::edge("knows"));

        let found = registry.lookup_by_label(ElementKind::Vertex, "person");
        assert!(!found.is_generic());
        assert_eq!(found.label(), "person");

        let fallback = registry.lookup_by_label(ElementKind::Vertex, "robot");
        assert!(fallback.is_generic());
        assert_eq!(fallback.kind(), ElementKind::Vertex);

        // Labels are scoped by kind
        let edge = registry.lookup_by_label(ElementKind::Edge, "person");
        assert!(edge.is_generic());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ElementKind::Vertex.to_string(), "vertex");
        assert_eq!(ElementKind::VertexProperty.to_string(), "vertex property");
    }
}
