// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Domain objects
//!
//! An [`Element`] is the in-memory form of a vertex or edge. Elements are
//! shared through [`ElementRef`] handles so that every part of a unit of work
//! that resolves the same backend identifier sees the same object.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::mapping::{Cardinality, ElementKind, Mapping, PropertyCodec};

/// Metadata attached to a single property value
pub type MetaProperties = BTreeMap<String, Value>;

/// One value of a multi-valued vertex property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyItem {
    pub value: Value,
    pub meta: MetaProperties,
    /// Backend identifier of this property value, once reconciled
    pub id: Option<Value>,
}

impl PropertyItem {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            meta: MetaProperties::new(),
            id: None,
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Attribute value held by an element
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Single(Value),
    Multi(Vec<PropertyItem>),
}

/// Wire-level property record produced for the property-addition steps
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub cardinality: Option<Cardinality>,
    pub key: String,
    pub value: Value,
    pub meta: MetaProperties,
}

/// In-memory vertex or edge
pub struct Element {
    mapping: Arc<Mapping>,
    label: String,
    id: Option<Value>,
    attributes: BTreeMap<String, Attribute>,
    source: Option<ElementRef>,
    target: Option<ElementRef>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Endpoints print as ids only; a full dump could recurse through shared handles
        f.debug_struct("Element")
            .field("kind", &self.kind())
            .field("label", &self.label)
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .field("source", &self.source.as_ref().map(ElementRef::id))
            .field("target", &self.target.as_ref().map(ElementRef::id))
            .finish()
    }
}

impl Element {
    /// Create an unsaved element of the given type
    pub fn new(mapping: Arc<Mapping>) -> Self {
        Self {
            label: mapping.label().to_string(),
            mapping,
            id: None,
            attributes: BTreeMap::new(),
            source: None,
            target: None,
        }
    }

    /// Create an unsaved edge between two vertices
    pub fn edge(mapping: Arc<Mapping>, source: ElementRef, target: ElementRef) -> Self {
        let mut edge = Self::new(mapping);
        edge.source = Some(source);
        edge.target = Some(target);
        edge
    }

    pub fn kind(&self) -> ElementKind {
        self.mapping.kind()
    }

    pub fn mapping(&self) -> &Arc<Mapping> {
        &self.mapping
    }

    /// Backend label; generic elements take it from the backend
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Backend identifier; `None` until persisted
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Value) {
        self.id = Some(id);
    }

    /// First value of an attribute
    pub fn get(&self, attr: &str) -> Option<&Value> {
        match self.attributes.get(attr)? {
            Attribute::Single(value) => Some(value),
            Attribute::Multi(items) => items.first().map(|item| &item.value),
        }
    }

    /// Every value of an attribute, in stored order
    pub fn values(&self, attr: &str) -> Vec<&Value> {
        match self.attributes.get(attr) {
            Some(Attribute::Single(value)) => vec![value],
            Some(Attribute::Multi(items)) => items.iter().map(|item| &item.value).collect(),
            None => Vec::new(),
        }
    }

    /// Property items of a multi-valued attribute
    pub fn items(&self, attr: &str) -> Option<&[PropertyItem]> {
        match self.attributes.get(attr)? {
            Attribute::Multi(items) => Some(items),
            Attribute::Single(_) => None,
        }
    }

    pub fn attribute(&self, attr: &str) -> Option<&Attribute> {
        self.attributes.get(attr)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Attribute> {
        &self.attributes
    }

    /// Replace the whole attribute table
    pub fn set_attributes(&mut self, attributes: BTreeMap<String, Attribute>) {
        self.attributes = attributes;
    }

    /// Set an attribute to a single value
    ///
    /// Attributes declared with a cardinality hold a one-item list instead.
    pub fn set(&mut self, attr: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let attr = attr.into();
        let value = value.into();
        let multi = self
            .mapping
            .property(&attr)
            .is_some_and(|def| def.cardinality.is_some());
        let attribute = if multi {
            Attribute::Multi(vec![PropertyItem::new(value)])
        } else {
            Attribute::Single(value)
        };
        self.attributes.insert(attr, attribute);
        self
    }

    /// Append a value to a multi-valued attribute
    pub fn push(&mut self, attr: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push_item(attr, PropertyItem::new(value))
    }

    /// Append a value that carries metadata
    pub fn push_item(&mut self, attr: impl Into<String>, item: PropertyItem) -> &mut Self {
        let entry = self
            .attributes
            .entry(attr.into())
            .or_insert_with(|| Attribute::Multi(Vec::new()));
        match entry {
            Attribute::Multi(items) => items.push(item),
            Attribute::Single(existing) => {
                let first = PropertyItem::new(std::mem::take(existing));
                *entry = Attribute::Multi(vec![first, item]);
            }
        }
        self
    }

    pub fn remove(&mut self, attr: &str) -> Option<Attribute> {
        self.attributes.remove(attr)
    }

    pub fn source(&self) -> Option<&ElementRef> {
        self.source.as_ref()
    }

    pub fn target(&self) -> Option<&ElementRef> {
        self.target.as_ref()
    }

    pub fn set_source(&mut self, source: ElementRef) {
        self.source = Some(source);
    }

    pub fn set_target(&mut self, target: ElementRef) {
        self.target = Some(target);
    }

    /// Translate the attribute table into wire-level property records
    ///
    /// Null values are kept; the traversal builder skips them.
    pub fn to_property_records(&self, codec: &PropertyCodec) -> Result<Vec<PropertyRecord>> {
        let mut records = Vec::new();
        for (attr, attribute) in &self.attributes {
            let declared = self.mapping.property(attr).and_then(|def| def.cardinality);
            match attribute {
                Attribute::Single(value) => {
                    let (key, value) = codec.encode(&self.mapping, attr, value)?;
                    let cardinality = match self.kind() {
                        ElementKind::Vertex => declared,
                        _ => None,
                    };
                    records.push(PropertyRecord {
                        cardinality,
                        key,
                        value,
                        meta: MetaProperties::new(),
                    });
                }
                Attribute::Multi(items) => {
                    if self.kind() != ElementKind::Vertex {
                        return Err(Error::Mapping(format!(
                            "{} property '{}' cannot hold multiple values",
                            self.kind(),
                            attr
                        )));
                    }
                    let cardinality = Some(declared.unwrap_or(Cardinality::List));
                    for item in items {
                        let (key, value) = codec.encode(&self.mapping, attr, &item.value)?;
                        records.push(PropertyRecord {
                            cardinality,
                            key,
                            value,
                            meta: item.meta.clone(),
                        });
                    }
                }
            }
        }
        Ok(records)
    }
}

/// Shared handle to a domain object
#[derive(Clone)]
pub struct ElementRef(Arc<RwLock<Element>>);

impl ElementRef {
    pub fn new(element: Element) -> Self {
        Self(Arc::new(RwLock::new(element)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Element> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Element> {
        self.0.write()
    }

    /// True when both handles point at the same object
    pub fn ptr_eq(a: &ElementRef, b: &ElementRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn kind(&self) -> ElementKind {
        self.read().kind()
    }

    pub fn id(&self) -> Option<Value> {
        self.read().id().cloned()
    }
}

impl From<Element> for ElementRef {
    fn from(element: Element) -> Self {
        Self::new(element)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(element) => element.fmt(f),
            None => f.write_str("Element(<locked>)"),
        }
    }
}
