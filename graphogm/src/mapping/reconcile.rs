// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reconciliation of fetched backend data into domain objects

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{DataType, PropertyCodec};
use crate::element::{Attribute, Element, MetaProperties, PropertyItem};
use crate::error::Result;
use crate::traversal::{GraphElement, VertexRef};

/// Fetched property data for one element
///
/// Vertices map each key to a list of values; a value that carries metadata
/// is an object holding the metadata plus `key`, `value` and `id`. Edges map
/// each key to its single value. Both include the `id` and `label` tokens.
pub type PropertyMap = Map<String, Value>;

const TOKEN_KEYS: [&str; 2] = ["id", "label"];

/// Merges raw backend data into a domain object
///
/// Implementations must be idempotent: applying the same data twice leaves
/// the object exactly as applying it once.
pub trait Reconciler: Send + Sync {
    fn reconcile(&self, raw: &GraphElement, props: &PropertyMap, target: &mut Element) -> Result<()>;
}

/// Default reconciler: replaces the attribute table with the fetched state
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardReconciler;

impl Reconciler for StandardReconciler {
    fn reconcile(&self, raw: &GraphElement, props: &PropertyMap, target: &mut Element) -> Result<()> {
        target.set_id(raw.id().clone());

        if target.mapping().is_generic() {
            let label = props
                .get("label")
                .and_then(Value::as_str)
                .or_else(|| raw.label());
            if let Some(label) = label {
                target.set_label(label);
            }
        }

        match raw {
            GraphElement::Vertex(_) => {
                let attributes = vertex_attributes(target, props)?;
                target.set_attributes(attributes);
            }
            GraphElement::Edge(edge) => {
                let attributes = edge_attributes(target, props)?;
                target.set_attributes(attributes);
                fill_endpoint(target.source(), &edge.out_v);
                fill_endpoint(target.target(), &edge.in_v);
            }
            GraphElement::VertexProperty(_) => {}
        }
        Ok(())
    }
}

fn declared(target: &Element, key: &str) -> (String, DataType, Option<bool>) {
    match target.mapping().attribute_for(key) {
        Some((attr, def)) => (attr.to_string(), def.data_type, Some(def.cardinality.is_some())),
        None => (key.to_string(), DataType::Any, None),
    }
}

fn vertex_attributes(target: &Element, props: &PropertyMap) -> Result<BTreeMap<String, Attribute>> {
    let codec = PropertyCodec::new();
    let mut attributes = BTreeMap::new();

    for (key, raw_value) in props {
        if TOKEN_KEYS.contains(&key.as_str()) {
            continue;
        }
        let (attr, data_type, multi) = declared(target, key);
        let entries: Vec<&Value> = match raw_value {
            Value::Array(values) => values.iter().collect(),
            other => vec![other],
        };

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            items.push(decode_item(&codec, data_type, key, entry)?);
        }

        let multi = multi
            .unwrap_or_else(|| items.len() > 1 || items.iter().any(|item| !item.meta.is_empty()));
        let attribute = if multi {
            Attribute::Multi(items)
        } else {
            match items.into_iter().next() {
                Some(item) => Attribute::Single(item.value),
                None => continue,
            }
        };
        attributes.insert(attr, attribute);
    }
    Ok(attributes)
}

fn edge_attributes(target: &Element, props: &PropertyMap) -> Result<BTreeMap<String, Attribute>> {
    let codec = PropertyCodec::new();
    let mut attributes = BTreeMap::new();

    for (key, raw_value) in props {
        if TOKEN_KEYS.contains(&key.as_str()) {
            continue;
        }
        let (attr, data_type, _) = declared(target, key);
        let value = codec.decode(data_type, raw_value)?;
        attributes.insert(attr, Attribute::Single(value));
    }
    Ok(attributes)
}

/// A vertex property entry with metadata arrives as
/// `{<meta>..., "key": <key>, "value": <value>, "id": <property id>}`
fn decode_item(codec: &PropertyCodec, data_type: DataType, key: &str, entry: &Value) -> Result<PropertyItem> {
    if let Value::Object(fields) = entry {
        let is_meta_entry = fields.get("key").and_then(Value::as_str) == Some(key)
            && fields.contains_key("value");
        if is_meta_entry {
            let value = codec.decode(data_type, &fields["value"])?;
            let meta: MetaProperties = fields
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "key" | "value" | "id"))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            return Ok(PropertyItem {
                value,
                meta,
                id: fields.get("id").cloned(),
            });
        }
    }
    Ok(PropertyItem::new(codec.decode(data_type, entry)?))
}

/// Give an unsaved endpoint the identifier reported by the backend
fn fill_endpoint(endpoint: Option<&crate::element::ElementRef>, reference: &VertexRef) {
    let Some(endpoint) = endpoint else {
        return;
    };
    let mut vertex = endpoint.write();
    if vertex.id().is_none() {
        vertex.set_id(reference.id.clone());
        if vertex.mapping().is_generic() {
            if let Some(label) = &reference.label {
                vertex.set_label(label.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementRef;
    use crate::mapping::{Cardinality, Mapping};
    use crate::traversal::EdgeRef;
    use serde_json::json;
    use std::sync::Arc;

    fn props(value: Value) -> PropertyMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn vertex_ref(id: i64) -> GraphElement {
        GraphElement::Vertex(VertexRef {
            id: json!(id),
            label: Some("person".to_string()),
        })
    }

    fn person() -> Arc<Mapping> {
        Arc::new(
            Mapping::vertex("person")
                .with_property_named("name", "full_name", DataType::String)
                .with_property("age", DataType::Integer)
                .with_multi_property("emails", DataType::String, Cardinality::List),
        )
    }

    #[test]
    fn test_vertex_reconcile() {
        let mut element = Element::new(person());
        element.set("stale", "gone");
        let data = props(json!({
            "id": 1,
            "label": "person",
            "full_name": ["Alice"],
            "age": ["30"],
            "emails": [
                "a@x",
                {"key": "emails", "value": "b@x", "id": 11, "primary": true}
            ],
        }));

        StandardReconciler.reconcile(&vertex_ref(1), &data, &mut element).unwrap();

        assert_eq!(element.id(), Some(&json!(1)));
        assert_eq!(element.get("name"), Some(&json!("Alice")));
        assert_eq!(element.get("age"), Some(&json!(30)));
        assert!(element.get("stale").is_none());

        let emails = element.items("emails").unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[1].id, Some(json!(11)));
        assert_eq!(emails[1].meta.get("primary"), Some(&json!(true)));
        assert!(!emails[1].meta.contains_key("key"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut element = Element::new(person());
        let data = props(json!({
            "id": 1,
            "label": "person",
            "emails": ["a@x", "b@x"],
        }));
        StandardReconciler.reconcile(&vertex_ref(1), &data, &mut element).unwrap();
        StandardReconciler.reconcile(&vertex_ref(1), &data, &mut element).unwrap();
        assert_eq!(element.values("emails"), vec![&json!("a@x"), &json!("b@x")]);
    }

    #[test]
    fn test_undeclared_multi_values_stay_multi() {
        let mut element = Element::new(Arc::new(Mapping::generic(crate::ElementKind::Vertex)));
        let data = props(json!({"id": 3, "label": "robot", "tags": ["a", "b"], "model": ["x1"]}));
        StandardReconciler.reconcile(&vertex_ref(3), &data, &mut element).unwrap();
        assert_eq!(element.label(), "robot");
        assert_eq!(element.values("tags").len(), 2);
        assert_eq!(element.attribute("model"), Some(&Attribute::Single(json!("x1"))));
    }

    #[test]
    fn test_edge_reconcile_fills_placeholder_endpoints() {
        let generic = Arc::new(Mapping::generic(crate::ElementKind::Vertex));
        let mut edge = Element::edge(
            Arc::new(Mapping::generic(crate::ElementKind::Edge)),
            ElementRef::new(Element::new(Arc::clone(&generic))),
            ElementRef::new(Element::new(generic)),
        );
        let raw = GraphElement::Edge(EdgeRef {
            id: json!({"relationId": "5"}),
            label: "knows".to_string(),
            out_v: VertexRef {
                id: json!(1),
                label: Some("person".to_string()),
            },
            in_v: VertexRef {
                id: json!(2),
                label: None,
            },
        });
        let data = props(json!({"id": {"relationId": "5"}, "label": "knows", "since": 2001}));

        StandardReconciler.reconcile(&raw, &data, &mut edge).unwrap();

        assert_eq!(edge.label(), "knows");
        assert_eq!(edge.get("since"), Some(&json!(2001)));
        assert_eq!(edge.source().unwrap().id(), Some(json!(1)));
        assert_eq!(edge.source().unwrap().read().label(), "person");
        assert_eq!(edge.target().unwrap().id(), Some(json!(2)));
    }
}
