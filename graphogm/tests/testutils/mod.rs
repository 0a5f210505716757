// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared fixtures for session integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use graphogm::executor::{RemoteExecutor, RemoteTraversal, SideEffects, TraverserStream};
use graphogm::{
    Bytecode, Cardinality, DataType, Element, ElementKind, ElementRef, Error, InMemoryExecutor,
    Mapping, Ogm, Registry, Result, ResultShape, SessionConfig, SessionObserver, WritePath,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Registry with a `person` vertex and a `knows` edge
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(
        Mapping::vertex("person")
            .with_property("name", DataType::String)
            .with_property("age", DataType::Integer)
            .with_multi_property("emails", DataType::String, Cardinality::List)
            .with_multi_property("tags", DataType::String, Cardinality::Set),
    );
    registry.register(Mapping::edge("knows").with_property("since", DataType::Integer));
    registry
}

/// Session event captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    WritePath(ElementKind, WritePath),
    Untracked(ElementKind, Value),
    StreamError(String),
    Closed(usize),
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn write_paths(&self) -> Vec<WritePath> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::WritePath(_, path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for RecordingObserver {
    fn write_path(&self, _session: Uuid, kind: ElementKind, path: WritePath) {
        self.events.lock().push(Event::WritePath(kind, path));
    }

    fn untracked_removal(&self, _session: Uuid, kind: ElementKind, id: &Value) {
        self.events.lock().push(Event::Untracked(kind, id.clone()));
    }

    fn stream_error(&self, _session: Uuid, error: &Error) {
        self.events.lock().push(Event::StreamError(error.to_string()));
    }

    fn session_closed(&self, _session: Uuid, cancelled: usize) {
        self.events.lock().push(Event::Closed(cancelled));
    }
}

/// Executor that serves scripted streams for empty bytecode and delegates
/// everything else to an in-memory graph
pub struct ScriptedExecutor {
    pub graph: Arc<InMemoryExecutor>,
    scripted: Mutex<VecDeque<Vec<Result<ResultShape>>>>,
    stalled: Mutex<Vec<mpsc::Sender<Result<ResultShape>>>>,
}

impl ScriptedExecutor {
    pub fn new(graph: Arc<InMemoryExecutor>) -> Self {
        Self {
            graph,
            scripted: Mutex::new(VecDeque::new()),
            stalled: Mutex::new(Vec::new()),
        }
    }

    /// Queue the results returned by the next empty-bytecode submission
    pub fn script(&self, results: Vec<Result<ResultShape>>) {
        self.scripted.lock().push_back(results);
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedExecutor {
    async fn submit(&self, bytecode: Bytecode) -> Result<RemoteTraversal> {
        if !bytecode.steps.is_empty() {
            return self.graph.submit(bytecode).await;
        }
        let next = self.scripted.lock().pop_front();
        let traversers = match next {
            Some(results) => TraverserStream::from_results(results),
            None => {
                // Nothing scripted: a stream that never produces anything
                let (tx, stream) = TraverserStream::channel(1);
                self.stalled.lock().push(tx);
                stream
            }
        };
        Ok(RemoteTraversal {
            traversers,
            side_effects: SideEffects::default(),
        })
    }
}

/// In-memory graph plus an application handle with a recording observer
pub struct Fixture {
    pub graph: Arc<InMemoryExecutor>,
    pub scripted: Arc<ScriptedExecutor>,
    pub observer: Arc<RecordingObserver>,
    pub ogm: Ogm,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_graph(InMemoryExecutor::new(), SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_graph(InMemoryExecutor::new(), config)
    }

    pub fn with_graph(graph: InMemoryExecutor, config: SessionConfig) -> Self {
        init_logging();
        let graph = Arc::new(graph);
        let scripted = Arc::new(ScriptedExecutor::new(Arc::clone(&graph)));
        let observer = Arc::new(RecordingObserver::default());
        let ogm = Ogm::new(scripted.clone(), registry())
            .with_config(config)
            .with_observer(observer.clone());
        Self {
            graph,
            scripted,
            observer,
            ogm,
        }
    }

    pub fn mapping(&self, kind: ElementKind, label: &str) -> Arc<Mapping> {
        self.ogm
            .registry()
            .get(kind, label)
            .expect("mapping not registered")
    }

    /// Unsaved person with a name
    pub fn person(&self, name: &str) -> ElementRef {
        let mut person = Element::new(self.mapping(ElementKind::Vertex, "person"));
        person.set("name", name);
        ElementRef::new(person)
    }

    /// Unsaved `knows` edge between two vertices
    pub fn knows(&self, source: &ElementRef, target: &ElementRef) -> ElementRef {
        ElementRef::new(Element::edge(
            self.mapping(ElementKind::Edge, "knows"),
            source.clone(),
            target.clone(),
        ))
    }

    /// Handle carrying only a backend identifier
    pub fn handle(&self, kind: ElementKind, label: &str, id: Value) -> ElementRef {
        let mut element = Element::new(self.mapping(kind, label));
        element.set_id(id);
        ElementRef::new(element)
    }
}
