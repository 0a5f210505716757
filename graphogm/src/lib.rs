// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GraphOGM - async object-graph mapping over traversal-based graph engines
//!
//! Application code works with typed vertices and edges; a [`Session`]
//! translates them into traversals for a remote engine and turns the results
//! back into the same in-memory objects.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use graphogm::{DataType, Element, ElementRef, InMemoryExecutor, Mapping, Ogm, Registry};
//!
//! # async fn run() -> graphogm::Result<()> {
//! let mut registry = Registry::new();
//! let person = registry.register(Mapping::vertex("person").with_property("name", DataType::String));
//!
//! let ogm = Ogm::new(Arc::new(InMemoryExecutor::new()), registry);
//! let session = ogm.session();
//!
//! let mut alice = Element::new(person);
//! alice.set("name", "Alice");
//! let alice = session.save(&ElementRef::new(alice)).await?;
//! assert!(alice.id().is_some());
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   Application Code (domain objects)     │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  Session (unit of work)                 │
//! │  - identity map / pending writes        │
//! │  - CRUD traversals                      │
//! │  - result deserializer                  │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  RemoteExecutor (transport, external)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - [`mapping`] - Mapping descriptors, registry, property codec, reconciliation
//! - [`element`] - Domain objects and shared handles
//! - [`traversal`] - Traversal steps, bytecode and result shapes
//! - [`executor`] - Remote executor contract and the in-memory executor
//! - [`session`] - Unit of work
//! - [`config`] - Session configuration
//! - [`error`] - Error types

pub mod app;
pub mod config;
pub mod element;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod session;
pub mod traversal;

// Re-export main types for convenience
pub use app::Ogm;
pub use config::{ResolutionDepth, SessionConfig};
pub use element::{Attribute, Element, ElementRef, MetaProperties, PropertyItem, PropertyRecord};
pub use error::{ElementError, Error, Result};
pub use executor::{InMemoryExecutor, RemoteExecutor, RemoteTraversal, SideEffects, TraverserStream};
pub use mapping::{
    Cardinality, DataType, ElementKind, Mapping, PropertyCodec, Reconciler, Registry,
    StandardReconciler,
};
pub use session::{
    HashableId, LogObserver, ResolvedTraversal, ResultSet, Session, SessionObserver, WritePath,
};
pub use traversal::{Binding, Bytecode, GraphElement, Payload, ResultShape, Step, Traversal};
