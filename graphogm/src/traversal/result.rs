// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result shapes produced by traversals

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::element::ElementRef;
use crate::mapping::ElementKind;

/// Vertex reference as emitted by the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRef {
    pub id: Value,
    /// Some protocols omit the label from references
    pub label: Option<String>,
}

/// Edge reference with its endpoint references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRef {
    pub id: Value,
    pub label: String,
    pub out_v: VertexRef,
    pub in_v: VertexRef,
}

/// Single vertex property value reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexPropertyRef {
    pub id: Value,
    pub key: String,
    pub value: Value,
}

/// Raw graph element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphElement {
    Vertex(VertexRef),
    Edge(EdgeRef),
    VertexProperty(VertexPropertyRef),
}

impl GraphElement {
    pub fn id(&self) -> &Value {
        match self {
            GraphElement::Vertex(v) => &v.id,
            GraphElement::Edge(e) => &e.id,
            GraphElement::VertexProperty(p) => &p.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            GraphElement::Vertex(_) => ElementKind::Vertex,
            GraphElement::Edge(_) => ElementKind::Edge,
            GraphElement::VertexProperty(_) => ElementKind::VertexProperty,
        }
    }

    /// Label when the reference carries one
    pub fn label(&self) -> Option<&str> {
        match self {
            GraphElement::Vertex(v) => v.label.as_deref(),
            GraphElement::Edge(e) => Some(&e.label),
            GraphElement::VertexProperty(p) => Some(&p.key),
        }
    }
}

/// Object carried by a traverser
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw element, not yet resolved
    Element(GraphElement),
    /// Element resolved to a domain object
    Object(ElementRef),
    /// Anything else (scalars, maps, lists)
    Shape(Box<ResultShape>),
}

/// Result object with its multiplicity
#[derive(Debug, Clone)]
pub struct Traverser {
    pub object: Payload,
    pub bulk: u64,
}

/// Any value a traversal can produce
#[derive(Debug, Clone)]
pub enum ResultShape {
    Scalar(Value),
    Traverser(Traverser),
    Sequence(Vec<ResultShape>),
    Mapping(BTreeMap<String, ResultShape>),
}

impl ResultShape {
    /// Traverser wrapping a raw element with bulk 1
    pub fn element(element: GraphElement) -> Self {
        Self::traverser(Payload::Element(element), 1)
    }

    /// Traverser wrapping a plain value with bulk 1
    pub fn value(shape: ResultShape) -> Self {
        Self::traverser(Payload::Shape(Box::new(shape)), 1)
    }

    pub fn traverser(object: Payload, bulk: u64) -> Self {
        ResultShape::Traverser(Traverser { object, bulk })
    }

    /// Multiplicity of a traverser; 1 for everything else
    pub fn bulk(&self) -> u64 {
        match self {
            ResultShape::Traverser(t) => t.bulk,
            _ => 1,
        }
    }

    /// Raw element carried by a traverser
    pub fn as_element(&self) -> Option<&GraphElement> {
        match self {
            ResultShape::Traverser(Traverser {
                object: Payload::Element(element),
                ..
            }) => Some(element),
            _ => None,
        }
    }

    pub fn into_element(self) -> Option<GraphElement> {
        match self {
            ResultShape::Traverser(Traverser {
                object: Payload::Element(element),
                ..
            }) => Some(element),
            _ => None,
        }
    }

    /// Domain object carried by a resolved traverser
    pub fn as_object(&self) -> Option<&ElementRef> {
        match self {
            ResultShape::Traverser(Traverser {
                object: Payload::Object(object),
                ..
            }) => Some(object),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<ElementRef> {
        match self {
            ResultShape::Traverser(Traverser {
                object: Payload::Object(object),
                ..
            }) => Some(object),
            _ => None,
        }
    }

    /// JSON view of a plain result; `None` if any element is involved
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ResultShape::Scalar(value) => Some(value.clone()),
            ResultShape::Traverser(Traverser {
                object: Payload::Shape(shape),
                ..
            }) => shape.to_json(),
            ResultShape::Traverser(_) => None,
            ResultShape::Sequence(items) => items
                .iter()
                .map(ResultShape::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            ResultShape::Mapping(entries) => entries
                .iter()
                .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                .collect::<Option<Map<String, Value>>>()
                .map(Value::Object),
        }
    }

    /// Plain result from JSON: arrays become sequences, objects mappings
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                ResultShape::Sequence(items.into_iter().map(ResultShape::from_json).collect())
            }
            Value::Object(entries) => ResultShape::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, ResultShape::from_json(v)))
                    .collect(),
            ),
            scalar => ResultShape::Scalar(scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip_of_plain_values() {
        let value = json!({"id": 1, "key": "name", "meta": {"since": 2020}, "tags": ["a", "b"]});
        let shape = ResultShape::value(ResultShape::from_json(value.clone()));
        assert_eq!(shape.to_json(), Some(value));
    }

    #[test]
    fn test_elements_have_no_json_view() {
        let vertex = GraphElement::Vertex(VertexRef {
            id: json!(1),
            label: None,
        });
        let shape = ResultShape::Sequence(vec![
            ResultShape::Scalar(json!(1)),
            ResultShape::element(vertex.clone()),
        ]);
        assert!(shape.to_json().is_none());
        assert_eq!(ResultShape::element(vertex.clone()).into_element(), Some(vertex));
    }

    #[test]
    fn test_element_accessors() {
        let edge = GraphElement::Edge(EdgeRef {
            id: json!({"relationId": "1"}),
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
        assert_eq!(edge.kind(), ElementKind::Edge);
        assert_eq!(edge.label(), Some("knows"));
        assert_eq!(edge.id(), &json!({"relationId": "1"}));
    }
}
