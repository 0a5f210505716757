// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result deserialization
//!
//! Walks a raw result and swaps every vertex or edge for its domain object.
//! Each element is looked up in the identity map first, so repeated results
//! for one backend identifier always resolve to the same [`ElementRef`].

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use super::SessionInner;
use crate::config::ResolutionDepth;
use crate::element::{Element, ElementRef};
use crate::error::{ElementError, Error, Result};
use crate::mapping::reconcile::PropertyMap;
use crate::mapping::ElementKind;
use crate::traversal::{anon, Binding, GraphElement, Payload, ResultShape, Traversal, Traverser};

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<ResultShape>> + Send + 'a>>;

impl SessionInner {
    /// Resolve every element in a raw result, honouring the configured depth
    pub(crate) async fn resolve_shape(&self, shape: ResultShape) -> Result<ResultShape> {
        self.resolve_at(shape, 0).await
    }

    fn resolve_at(&self, shape: ResultShape, level: usize) -> ResolveFuture<'_> {
        Box::pin(async move {
            let descend = level == 0 || self.config.resolution_depth == ResolutionDepth::Deep;
            match shape {
                ResultShape::Traverser(Traverser {
                    object: Payload::Element(element),
                    bulk,
                }) if element.kind() != ElementKind::VertexProperty => {
                    let object = self.resolve_element(element).await?;
                    Ok(ResultShape::traverser(Payload::Object(object), bulk))
                }
                ResultShape::Sequence(items) if descend => {
                    let mut resolved = Vec::with_capacity(items.len());
                    for item in items {
                        resolved.push(self.resolve_at(item, level + 1).await?);
                    }
                    Ok(ResultShape::Sequence(resolved))
                }
                ResultShape::Mapping(entries) if descend => {
                    let mut resolved = BTreeMap::new();
                    for (key, value) in entries {
                        resolved.insert(key, self.resolve_at(value, level + 1).await?);
                    }
                    Ok(ResultShape::Mapping(resolved))
                }
                other => Ok(other),
            }
        })
    }

    /// Domain object for a raw element, reusing the tracked one when present
    pub(crate) async fn resolve_element(&self, element: GraphElement) -> Result<ElementRef> {
        let element = match element {
            GraphElement::Vertex(mut vertex) if vertex.label.is_none() => {
                vertex.label = Some(self.vertex_label(&vertex.id).await?);
                GraphElement::Vertex(vertex)
            }
            other => other,
        };
        let key = (self.hashable_id)(element.id());
        let tracked = self.state.lock().resolve(&key);

        let target = match (&element, tracked) {
            (_, Some(tracked)) => tracked,
            (GraphElement::Vertex(vertex), None) => {
                let label = vertex.label.as_deref().unwrap_or_default();
                let mapping = self.registry.lookup_by_label(ElementKind::Vertex, label);
                ElementRef::new(Element::new(mapping))
            }
            (GraphElement::Edge(edge), None) => {
                let mapping = self.registry.lookup_by_label(ElementKind::Edge, &edge.label);
                let source = self.endpoint(&edge.out_v.id);
                let target = self.endpoint(&edge.in_v.id);
                ElementRef::new(Element::edge(mapping, source, target))
            }
            (GraphElement::VertexProperty(_), None) => {
                return Err(ElementError::UnknownKind(ElementKind::VertexProperty).into());
            }
        };

        self.reconcile_into(&element, &target).await?;
        self.state.lock().put(key, target.clone());
        Ok(target)
    }

    /// Tracked vertex for an edge endpoint, or a generic placeholder
    fn endpoint(&self, id: &Value) -> ElementRef {
        let tracked = self.state.lock().resolve(&(self.hashable_id)(id));
        tracked.unwrap_or_else(|| {
            ElementRef::new(Element::new(self.registry.generic(ElementKind::Vertex)))
        })
    }

    /// Fetch full property data for a raw element and merge it into `target`
    pub(crate) async fn reconcile_into(&self, raw: &GraphElement, target: &ElementRef) -> Result<()> {
        let props = match raw {
            GraphElement::Vertex(vertex) => {
                let label = match &vertex.label {
                    Some(label) => label.clone(),
                    None => self.vertex_label(&vertex.id).await?,
                };
                self.vertex_properties(&vertex.id, &label).await?
            }
            GraphElement::Edge(edge) => self.edge_properties(&edge.id).await?,
            GraphElement::VertexProperty(_) => return Ok(()),
        };

        let reconciler = target.read().mapping().reconciler();
        let mut object = target.write();
        reconciler.reconcile(raw, &props, &mut object)
    }

    async fn vertex_label(&self, id: &Value) -> Result<String> {
        let bytecode = Traversal::new()
            .v_id(Binding::vertex_id(id.clone()))
            .label()
            .into_bytecode();
        let result = self.executor()?.next(bytecode).await?;
        match result.and_then(|shape| shape.to_json()) {
            Some(Value::String(label)) => Ok(label),
            _ => Err(Error::remote(format!("vertex {} has no label", id))),
        }
    }

    /// Every property of a vertex as `{key: [values]}` plus the id/label tokens
    ///
    /// A value carrying metadata becomes `{<meta>..., key, value, id}`.
    async fn vertex_properties(&self, id: &Value, label: &str) -> Result<PropertyMap> {
        let bytecode = Traversal::new()
            .v_id(Binding::vertex_id(id.clone()))
            .properties()
            .project(&["id", "key", "value", "meta"])
            .by(anon::id())
            .by(anon::key())
            .by(anon::value())
            .by(anon::value_map())
            .into_bytecode();
        let rows = self.executor()?.to_list(bytecode).await?;

        let mut props = PropertyMap::new();
        props.insert("label".to_string(), json!(label));
        props.insert("id".to_string(), id.clone());

        for row in rows {
            let Some(Value::Object(mut row)) = row.to_json() else {
                continue;
            };
            let Some(Value::String(key)) = row.remove("key") else {
                continue;
            };
            let value = row.remove("value").unwrap_or(Value::Null);
            let entry = match row.remove("meta") {
                Some(Value::Object(mut meta)) if !meta.is_empty() => {
                    meta.insert("key".to_string(), json!(key));
                    meta.insert("value".to_string(), value);
                    meta.insert("id".to_string(), row.remove("id").unwrap_or(Value::Null));
                    Value::Object(meta)
                }
                _ => value,
            };
            if let Value::Array(values) = props.entry(key).or_insert_with(|| json!([])) {
                values.push(entry);
            }
        }
        Ok(props)
    }

    async fn edge_properties(&self, id: &Value) -> Result<PropertyMap> {
        let bytecode = Traversal::new()
            .e_id(Binding::edge_id(id.clone()))
            .value_map(true)
            .into_bytecode();
        let result = self.executor()?.next(bytecode).await?;
        match result.and_then(|shape| shape.to_json()) {
            Some(Value::Object(props)) => Ok(props),
            _ => Ok(PropertyMap::new()),
        }
    }
}
