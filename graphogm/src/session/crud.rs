// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Create/update/delete traversals
//!
//! Saves are check-then-act: an element that carries a backend identifier is
//! looked up first and updated when found, otherwise it is created. Updates
//! drop every stored property and re-add the in-memory state in full.

use serde_json::Value;

use super::observer::WritePath;
use super::SessionInner;
use crate::element::ElementRef;
use crate::error::{ElementError, Error, Result};
use crate::mapping::ElementKind;
use crate::traversal::{anon, Binding, GraphElement, Traversal};

fn expect_kind(element: &ElementRef, expected: ElementKind) -> Result<()> {
    let actual = element.kind();
    if actual != expected {
        return Err(ElementError::KindMismatch { expected, actual }.into());
    }
    Ok(())
}

fn require_id(element: &ElementRef) -> Result<Value> {
    element
        .id()
        .ok_or_else(|| ElementError::MissingId(element.kind()).into())
}

impl SessionInner {
    /// Save a vertex or an edge
    pub(crate) async fn save(&self, element: &ElementRef) -> Result<ElementRef> {
        match element.kind() {
            ElementKind::Vertex => self.save_vertex(element).await,
            ElementKind::Edge => self.save_edge(element).await,
            kind => Err(ElementError::UnknownKind(kind).into()),
        }
    }

    pub(crate) async fn save_vertex(&self, element: &ElementRef) -> Result<ElementRef> {
        expect_kind(element, ElementKind::Vertex)?;
        let (id, label, records) = {
            let vertex = element.read();
            (
                vertex.id().cloned(),
                vertex.label().to_string(),
                vertex.to_property_records(&self.codec)?,
            )
        };

        let exists = match &id {
            Some(id) => self.exists(vertex_lookup(id)).await?,
            None => false,
        };
        let traversal = match id {
            Some(id) if exists => {
                self.observer.write_path(self.id, ElementKind::Vertex, WritePath::Update);
                self.drop_properties(vertex_lookup(&id)).await?;
                vertex_lookup(&id).with_properties(&records)
            }
            _ => {
                self.observer.write_path(self.id, ElementKind::Vertex, WritePath::Create);
                Traversal::new().add_v(label).with_properties(&records)
            }
        };

        self.simple_traversal(traversal, element).await?;
        self.track_saved(element)
    }

    pub(crate) async fn save_edge(&self, element: &ElementRef) -> Result<ElementRef> {
        expect_kind(element, ElementKind::Edge)?;
        let (id, label, records, source, target) = {
            let edge = element.read();
            let (Some(source), Some(target)) = (edge.source().cloned(), edge.target().cloned())
            else {
                return Err(ElementError::MissingEndpoints.into());
            };
            (
                edge.id().cloned(),
                edge.label().to_string(),
                edge.to_property_records(&self.codec)?,
                source,
                target,
            )
        };

        let exists = match &id {
            Some(id) => self.exists(edge_lookup(id)).await?,
            None => false,
        };
        let traversal = match id {
            Some(id) if exists => {
                self.observer.write_path(self.id, ElementKind::Edge, WritePath::Update);
                self.drop_properties(edge_lookup(&id)).await?;
                edge_lookup(&id).with_properties(&records)
            }
            _ => {
                let source_id = source.id().ok_or(ElementError::UnsavedEndpoint("source"))?;
                let target_id = target.id().ok_or(ElementError::UnsavedEndpoint("target"))?;
                self.observer.write_path(self.id, ElementKind::Edge, WritePath::Create);
                Traversal::new()
                    .v_id(Binding::source_id(source_id))
                    .add_e(label)
                    .to(anon::v_id(Binding::target_id(target_id)))
                    .with_properties(&records)
            }
        };

        self.simple_traversal(traversal, element).await?;
        self.track_saved(element)
    }

    pub(crate) async fn remove_vertex(&self, element: &ElementRef) -> Result<()> {
        expect_kind(element, ElementKind::Vertex)?;
        let id = require_id(element)?;
        self.simple_traversal(vertex_lookup(&id).drop(), element).await?;
        self.forget(ElementKind::Vertex, &id);
        Ok(())
    }

    pub(crate) async fn remove_edge(&self, element: &ElementRef) -> Result<()> {
        expect_kind(element, ElementKind::Edge)?;
        let id = require_id(element)?;
        self.simple_traversal(edge_lookup(&id).drop(), element).await?;
        self.forget(ElementKind::Edge, &id);
        Ok(())
    }

    /// Point lookup used for the existence check; does not touch the identity map
    async fn exists(&self, lookup: Traversal) -> Result<bool> {
        let found = self.executor()?.next(lookup.into_bytecode()).await?;
        Ok(found.is_some())
    }

    async fn drop_properties(&self, lookup: Traversal) -> Result<()> {
        self.executor()?
            .to_list(lookup.properties().drop().into_bytecode())
            .await?;
        Ok(())
    }

    /// Run a write traversal and reconcile its single result into `element`
    async fn simple_traversal(&self, traversal: Traversal, element: &ElementRef) -> Result<()> {
        let result = self.executor()?.next(traversal.into_bytecode()).await?;
        if let Some(raw) = result.and_then(|shape| shape.into_element()) {
            if !matches!(raw, GraphElement::VertexProperty(_)) {
                self.reconcile_into(&raw, element).await?;
            }
        }
        Ok(())
    }

    fn track_saved(&self, element: &ElementRef) -> Result<ElementRef> {
        let id = element.id().ok_or_else(|| {
            Error::remote(format!("saving {} returned no element", element.kind()))
        })?;
        self.state
            .lock()
            .put((self.hashable_id)(&id), element.clone());
        Ok(element.clone())
    }

    fn forget(&self, kind: ElementKind, id: &Value) {
        let evicted = self.state.lock().evict(&(self.hashable_id)(id));
        if evicted.is_none() {
            self.observer.untracked_removal(self.id, kind, id);
        }
    }
}

fn vertex_lookup(id: &Value) -> Traversal {
    Traversal::new().v_id(Binding::vertex_id(id.clone()))
}

fn edge_lookup(id: &Value) -> Traversal {
    Traversal::new().e_id(Binding::edge_id(id.clone()))
}

