// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Unit of work over a remote graph
//!
//! This module provides:
//! - [`Session`], which tracks resolved objects and pending writes
//! - Check-then-act saves, full-overwrite updates and removals
//! - Streaming submissions whose results come back as domain objects
//! - The injectable [`SessionObserver`] used for session events
//!
//! A session is a single-flow object: drive it from one task at a time.

mod crud;
mod deserializer;
pub mod observer;
pub mod result_set;
pub mod unit_of_work;

pub use observer::{LogObserver, SessionObserver, WritePath};
pub use result_set::{ResolvedTraversal, ResultSet};
pub use unit_of_work::{canonical_id, default_hashable_id, HashableId, HashableIdFn};

use log::debug;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::element::ElementRef;
use crate::error::{ElementError, Error, Result};
use crate::executor::RemoteExecutor;
use crate::mapping::{ElementKind, Mapping, PropertyCodec, Registry};
use crate::traversal::{Binding, Bytecode, ResultShape, Traversal};
use unit_of_work::UnitOfWork;

/// Shared state behind a [`Session`]; drain tasks hold it weakly
pub(crate) struct SessionInner {
    id: Uuid,
    executor: RwLock<Option<Arc<dyn RemoteExecutor>>>,
    registry: Arc<Registry>,
    hashable_id: HashableIdFn,
    config: SessionConfig,
    codec: PropertyCodec,
    observer: Arc<dyn SessionObserver>,
    state: Mutex<UnitOfWork>,
    tasks: Mutex<JoinSet<()>>,
}

impl SessionInner {
    /// Executor handle, or `ClosedSession` once the session is closed
    pub(crate) fn executor(&self) -> Result<Arc<dyn RemoteExecutor>> {
        self.executor.read().clone().ok_or(Error::ClosedSession)
    }

    fn ensure_open(&self) -> Result<()> {
        self.executor().map(|_| ())
    }
}

/// Identity-tracking unit of work
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("closed", &self.is_closed())
            .field("pending", &self.pending_len())
            .finish()
    }
}

impl Session {
    pub(crate) fn new(
        executor: Arc<dyn RemoteExecutor>,
        registry: Arc<Registry>,
        hashable_id: HashableIdFn,
        config: SessionConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let codec = if config.strict_properties {
            PropertyCodec::strict()
        } else {
            PropertyCodec::new()
        };
        let id = Uuid::new_v4();
        debug!("Opened session {}", id);
        Self {
            inner: Arc::new(SessionInner {
                id,
                executor: RwLock::new(Some(executor)),
                registry,
                hashable_id,
                config,
                codec,
                observer,
                state: Mutex::new(UnitOfWork::default()),
                tasks: Mutex::new(JoinSet::new()),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    // Traversal API

    /// Plain traversal source
    pub fn g(&self) -> Traversal {
        Traversal::new()
    }

    /// Traversal source seeded with a type's element kind and label
    ///
    /// Generic types only select the element kind.
    pub fn traversal(&self, mapping: Option<&Mapping>) -> Traversal {
        let Some(mapping) = mapping else {
            return Traversal::new();
        };
        let traversal = match mapping.kind() {
            ElementKind::Vertex => Traversal::new().v(),
            ElementKind::Edge => Traversal::new().e(),
            ElementKind::VertexProperty => return Traversal::new(),
        };
        if mapping.is_generic() {
            traversal
        } else {
            traversal.has_label(mapping.label())
        }
    }

    /// Flush pending writes, submit a traversal and stream back resolved results
    pub async fn submit(&self, traversal: impl Into<Bytecode>) -> Result<ResolvedTraversal> {
        self.flush().await?;
        let bytecode: Bytecode = traversal.into();
        debug!("Session {} submitting {}", self.inner.id, bytecode.to_json_string());

        let remote = self.inner.executor()?.submit(bytecode).await?;
        let (tx, results) = ResultSet::channel(self.inner.config.channel_capacity());
        let drain = result_set::receive(Arc::downgrade(&self.inner), remote.traversers, tx);
        {
            let mut tasks = self.inner.tasks.lock();
            // Closed while the executor was answering: the dropped sender
            // surfaces as `ClosedSession` on the result set
            if !self.is_closed() {
                while tasks.try_join_next().is_some() {}
                tasks.spawn(drain);
            }
        }
        Ok(ResolvedTraversal {
            results,
            side_effects: remote.side_effects,
        })
    }

    /// Every resolved result of a traversal
    pub async fn to_list(&self, traversal: impl Into<Bytecode>) -> Result<Vec<ResultShape>> {
        self.submit(traversal).await?.results.all().await
    }

    /// First resolved result of a traversal, if any
    pub async fn next(&self, traversal: impl Into<Bytecode>) -> Result<Option<ResultShape>> {
        self.submit(traversal).await?.results.one().await.transpose()
    }

    // Creation API

    /// Queue elements for the next flush, in call order
    pub fn add(&self, elements: impl IntoIterator<Item = ElementRef>) -> Result<()> {
        self.inner.ensure_open()?;
        self.inner.state.lock().enqueue(elements);
        Ok(())
    }

    /// Save queued elements until the queue is empty
    ///
    /// Elements queued while flushing are saved in the same pass.
    pub async fn flush(&self) -> Result<()> {
        self.inner.ensure_open()?;
        loop {
            let next = self.inner.state.lock().pop_pending();
            let Some(element) = next else {
                return Ok(());
            };
            self.inner.save(&element).await?;
        }
    }

    /// Save a vertex or an edge
    pub async fn save(&self, element: &ElementRef) -> Result<ElementRef> {
        self.inner.save(element).await
    }

    pub async fn save_vertex(&self, vertex: &ElementRef) -> Result<ElementRef> {
        self.inner.save_vertex(vertex).await
    }

    pub async fn save_edge(&self, edge: &ElementRef) -> Result<ElementRef> {
        self.inner.save_edge(edge).await
    }

    /// Drop a vertex; a vertex this session does not track is logged, not rejected
    pub async fn remove_vertex(&self, vertex: &ElementRef) -> Result<()> {
        self.inner.remove_vertex(vertex).await
    }

    /// Drop an edge; an edge this session does not track is logged, not rejected
    pub async fn remove_edge(&self, edge: &ElementRef) -> Result<()> {
        self.inner.remove_edge(edge).await
    }

    /// Fetch a vertex by the element's identifier
    pub async fn get_vertex(&self, vertex: &ElementRef) -> Result<Option<ElementRef>> {
        let id = self.lookup_id(vertex, ElementKind::Vertex)?;
        let traversal = self.g().v_id(Binding::vertex_id(id));
        Ok(self.next(traversal).await?.and_then(ResultShape::into_object))
    }

    /// Fetch an edge by the element's identifier
    pub async fn get_edge(&self, edge: &ElementRef) -> Result<Option<ElementRef>> {
        let id = self.lookup_id(edge, ElementKind::Edge)?;
        let traversal = self.g().e_id(Binding::edge_id(id));
        Ok(self.next(traversal).await?.and_then(ResultShape::into_object))
    }

    fn lookup_id(&self, element: &ElementRef, expected: ElementKind) -> Result<Value> {
        let actual = element.kind();
        if actual != expected {
            return Err(ElementError::KindMismatch { expected, actual }.into());
        }
        element
            .id()
            .ok_or_else(|| ElementError::MissingId(actual).into())
    }

    // Unit-of-work state

    /// Tracked object for a backend identifier
    pub fn current(&self, id: &Value) -> Option<ElementRef> {
        let key = (self.inner.hashable_id)(id);
        self.inner.state.lock().resolve(&key)
    }

    pub fn tracked_len(&self) -> usize {
        self.inner.state.lock().tracked_len()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending_len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.executor.read().is_none()
    }

    /// Close the session
    ///
    /// Releases the executor, cancels and awaits every in-flight drain task,
    /// then discards tracked objects and queued writes. Consumers of cancelled
    /// streams read a `ClosedSession` error. Closing twice is a no-op.
    pub async fn close(&self) {
        if self.inner.executor.write().take().is_none() {
            return;
        }

        let mut tasks = std::mem::take(&mut *self.inner.tasks.lock());
        while tasks.try_join_next().is_some() {}
        let in_flight = tasks.len();
        tasks.shutdown().await;

        // Drain tasks are gone, nothing can repopulate the identity map
        self.inner.state.lock().clear();
        self.inner.observer.session_closed(self.inner.id, in_flight);
    }
}
