// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory reference executor
//!
//! Interprets traversal bytecode against an in-process property graph.
//! Intended for tests and local development; it has no transactions, so a
//! traversal that fails halfway keeps the mutations made before the failure.
//!
//! Identifiers:
//! - vertices and vertex properties share one integer counter
//! - edges use structured identifiers: `{"relationId": "<n>"}`

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::{RemoteExecutor, RemoteTraversal, SideEffects, TraverserStream};
use crate::error::{Error, Result};
use crate::mapping::Cardinality;
use crate::traversal::{
    Arg, Bytecode, EdgeRef, GraphElement, ResultShape, Step, VertexPropertyRef, VertexRef,
};

#[derive(Debug, Clone)]
struct StoredProperty {
    id: u64,
    key: String,
    value: Value,
    meta: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
struct StoredVertex {
    label: String,
    properties: Vec<StoredProperty>,
}

#[derive(Debug, Clone)]
struct StoredEdge {
    label: String,
    out_v: u64,
    in_v: u64,
    properties: BTreeMap<String, Value>,
}

/// Traverser position while interpreting a traversal
#[derive(Debug, Clone)]
enum Item {
    Vertex(u64),
    Edge(u64),
    VertexProperty { vertex: u64, property: u64 },
    EdgeProperty { edge: u64, key: String },
    Value(Value),
}

#[derive(Debug, Default)]
struct MemoryGraph {
    next_id: u64,
    vertices: BTreeMap<u64, StoredVertex>,
    edges: BTreeMap<u64, StoredEdge>,
}

fn edge_id_value(id: u64) -> Value {
    json!({ "relationId": id.to_string() })
}

fn interpretation_error(msg: impl Into<String>) -> Error {
    Error::remote(msg)
}

fn arg_value(arg: &Arg) -> Result<&Value> {
    arg.resolve()
        .ok_or_else(|| interpretation_error("expected a value argument, got a traversal"))
}

fn arg_string(arg: &Arg) -> Result<String> {
    arg_value(arg)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| interpretation_error("expected a string argument"))
}

fn parse_vertex_id(value: &Value) -> Option<u64> {
    value.as_u64()
}

fn parse_edge_id(value: &Value) -> Option<u64> {
    match value {
        Value::Object(fields) => fields
            .get("relationId")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
        other => other.as_u64(),
    }
}

impl MemoryGraph {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn vertex(&self, id: u64) -> Result<&StoredVertex> {
        self.vertices
            .get(&id)
            .ok_or_else(|| interpretation_error(format!("vertex {} does not exist", id)))
    }

    fn vertex_mut(&mut self, id: u64) -> Result<&mut StoredVertex> {
        self.vertices
            .get_mut(&id)
            .ok_or_else(|| interpretation_error(format!("vertex {} does not exist", id)))
    }

    fn edge(&self, id: u64) -> Result<&StoredEdge> {
        self.edges
            .get(&id)
            .ok_or_else(|| interpretation_error(format!("edge {} does not exist", id)))
    }

    fn run(&mut self, bytecode: &Bytecode, start: Option<Vec<Item>>) -> Result<Vec<Item>> {
        let mut started = start.is_some();
        let mut items = start.unwrap_or_default();
        let mut steps = bytecode.steps.iter().peekable();

        while let Some(step) = steps.next() {
            items = match step {
                Step::V(ids) => self.lookup_vertices(ids)?,
                Step::E(ids) => self.lookup_edges(ids)?,
                Step::AddV(label) => {
                    let label = arg_string(label)?;
                    let count = if started { items.len() } else { 1 };
                    (0..count)
                        .map(|_| {
                            let id = self.allocate_id();
                            self.vertices.insert(
                                id,
                                StoredVertex {
                                    label: label.clone(),
                                    properties: Vec::new(),
                                },
                            );
                            Item::Vertex(id)
                        })
                        .collect()
                }
                Step::AddE(label) => {
                    let label = arg_string(label)?;
                    let target = match steps.next() {
                        Some(Step::To(target)) => self.run(target, None)?,
                        _ => return Err(interpretation_error("addE must be followed by to()")),
                    };
                    let in_v = match target.first() {
                        Some(Item::Vertex(id)) => *id,
                        _ => return Err(interpretation_error("to() did not resolve a vertex")),
                    };
                    self.add_edges(&items, &label, in_v)?
                }
                Step::To(_) => return Err(interpretation_error("to() without addE")),
                Step::HasLabel(labels) => items
                    .into_iter()
                    .filter(|item| {
                        self.item_label(item)
                            .is_some_and(|label| labels.iter().any(|l| l == label))
                    })
                    .collect(),
                Step::Property {
                    cardinality,
                    key,
                    value,
                    meta,
                } => {
                    let key = arg_string(key)?;
                    let value = arg_value(value)?.clone();
                    let meta = Self::meta_pairs(meta)?;
                    for item in &items {
                        self.set_property(item, *cardinality, &key, &value, &meta)?;
                    }
                    items
                }
                Step::Properties(keys) => self.expand_properties(&items, keys),
                Step::Drop => {
                    for item in &items {
                        self.drop_item(item);
                    }
                    Vec::new()
                }
                Step::Label => items
                    .iter()
                    .filter_map(|item| self.item_label(item).map(|l| Item::Value(json!(l))))
                    .collect(),
                Step::Id => items
                    .iter()
                    .map(|item| self.item_id(item).map(Item::Value))
                    .collect::<Result<_>>()?,
                Step::Key => items
                    .iter()
                    .map(|item| self.item_key(item).map(|k| Item::Value(json!(k))))
                    .collect::<Result<_>>()?,
                Step::Value => items
                    .iter()
                    .map(|item| self.item_value(item).map(Item::Value))
                    .collect::<Result<_>>()?,
                Step::ValueMap { with_tokens } => items
                    .iter()
                    .map(|item| self.value_map(item, *with_tokens).map(Item::Value))
                    .collect::<Result<_>>()?,
                Step::Project(keys) => {
                    let mut modulators = Vec::new();
                    while let Some(Step::By(child)) = steps.peek().copied() {
                        modulators.push(child);
                        steps.next();
                    }
                    self.project(&items, keys, &modulators)?
                }
                Step::By(_) => return Err(interpretation_error("by() without project()")),
            };
            started = true;
        }
        Ok(items)
    }

    fn lookup_vertices(&self, ids: &[Arg]) -> Result<Vec<Item>> {
        if ids.is_empty() {
            return Ok(self.vertices.keys().map(|id| Item::Vertex(*id)).collect());
        }
        let mut found = Vec::new();
        for arg in ids {
            if let Some(id) = parse_vertex_id(arg_value(arg)?) {
                if self.vertices.contains_key(&id) {
                    found.push(Item::Vertex(id));
                }
            }
        }
        Ok(found)
    }

    fn lookup_edges(&self, ids: &[Arg]) -> Result<Vec<Item>> {
        if ids.is_empty() {
            return Ok(self.edges.keys().map(|id| Item::Edge(*id)).collect());
        }
        let mut found = Vec::new();
        for arg in ids {
            if let Some(id) = parse_edge_id(arg_value(arg)?) {
                if self.edges.contains_key(&id) {
                    found.push(Item::Edge(id));
                }
            }
        }
        Ok(found)
    }

    fn add_edges(&mut self, sources: &[Item], label: &str, in_v: u64) -> Result<Vec<Item>> {
        let mut created = Vec::with_capacity(sources.len());
        for source in sources {
            let Item::Vertex(out_v) = source else {
                return Err(interpretation_error("addE requires vertex traversers"));
            };
            let id = self.allocate_id();
            self.edges.insert(
                id,
                StoredEdge {
                    label: label.to_string(),
                    out_v: *out_v,
                    in_v,
                    properties: BTreeMap::new(),
                },
            );
            created.push(Item::Edge(id));
        }
        Ok(created)
    }

    fn meta_pairs(meta: &[Arg]) -> Result<Vec<(String, Value)>> {
        if meta.len() % 2 != 0 {
            return Err(interpretation_error("meta-properties must come in key/value pairs"));
        }
        meta.chunks(2)
            .map(|pair| Ok((arg_string(&pair[0])?, arg_value(&pair[1])?.clone())))
            .collect()
    }

    fn set_property(
        &mut self,
        item: &Item,
        cardinality: Option<Cardinality>,
        key: &str,
        value: &Value,
        meta: &[(String, Value)],
    ) -> Result<()> {
        match item {
            Item::Vertex(id) => {
                let property_id = self.allocate_id();
                let vertex = self.vertex_mut(*id)?;
                match cardinality.unwrap_or(Cardinality::Single) {
                    Cardinality::Single => vertex.properties.retain(|p| p.key != key),
                    Cardinality::List => {}
                    Cardinality::Set => {
                        if vertex.properties.iter().any(|p| p.key == key && &p.value == value) {
                            return Ok(());
                        }
                    }
                }
                vertex.properties.push(StoredProperty {
                    id: property_id,
                    key: key.to_string(),
                    value: value.clone(),
                    meta: meta.iter().cloned().collect(),
                });
                Ok(())
            }
            Item::Edge(id) => {
                if !meta.is_empty() || matches!(cardinality, Some(Cardinality::List | Cardinality::Set)) {
                    return Err(interpretation_error(
                        "edge properties take a single value without meta-properties",
                    ));
                }
                let edge = self
                    .edges
                    .get_mut(id)
                    .ok_or_else(|| interpretation_error(format!("edge {} does not exist", id)))?;
                edge.properties.insert(key.to_string(), value.clone());
                Ok(())
            }
            Item::VertexProperty { vertex, property } => {
                let vertex = self.vertex_mut(*vertex)?;
                if let Some(stored) = vertex.properties.iter_mut().find(|p| p.id == *property) {
                    stored.meta.insert(key.to_string(), value.clone());
                }
                Ok(())
            }
            _ => Err(interpretation_error("property() requires an element")),
        }
    }

    fn expand_properties(&self, items: &[Item], keys: &[String]) -> Vec<Item> {
        let wanted = |key: &str| keys.is_empty() || keys.iter().any(|k| k == key);
        let mut expanded = Vec::new();
        for item in items {
            match item {
                Item::Vertex(id) => {
                    if let Some(vertex) = self.vertices.get(id) {
                        expanded.extend(vertex.properties.iter().filter(|p| wanted(&p.key)).map(
                            |p| Item::VertexProperty {
                                vertex: *id,
                                property: p.id,
                            },
                        ));
                    }
                }
                Item::Edge(id) => {
                    if let Some(edge) = self.edges.get(id) {
                        expanded.extend(edge.properties.keys().filter(|k| wanted(k)).map(|k| {
                            Item::EdgeProperty {
                                edge: *id,
                                key: k.clone(),
                            }
                        }));
                    }
                }
                _ => {}
            }
        }
        expanded
    }

    fn drop_item(&mut self, item: &Item) {
        match item {
            Item::Vertex(id) => {
                self.vertices.remove(id);
                self.edges.retain(|_, edge| edge.out_v != *id && edge.in_v != *id);
            }
            Item::Edge(id) => {
                self.edges.remove(id);
            }
            Item::VertexProperty { vertex, property } => {
                if let Some(vertex) = self.vertices.get_mut(vertex) {
                    vertex.properties.retain(|p| p.id != *property);
                }
            }
            Item::EdgeProperty { edge, key } => {
                if let Some(edge) = self.edges.get_mut(edge) {
                    edge.properties.remove(key);
                }
            }
            Item::Value(_) => {}
        }
    }

    fn stored_property(&self, vertex: u64, property: u64) -> Result<&StoredProperty> {
        self.vertex(vertex)?
            .properties
            .iter()
            .find(|p| p.id == property)
            .ok_or_else(|| interpretation_error(format!("vertex property {} does not exist", property)))
    }

    fn item_label<'a>(&'a self, item: &'a Item) -> Option<&'a str> {
        match item {
            Item::Vertex(id) => self.vertices.get(id).map(|v| v.label.as_str()),
            Item::Edge(id) => self.edges.get(id).map(|e| e.label.as_str()),
            Item::VertexProperty { vertex, property } => self
                .stored_property(*vertex, *property)
                .ok()
                .map(|p| p.key.as_str()),
            Item::EdgeProperty { key, .. } => Some(key.as_str()),
            Item::Value(_) => None,
        }
    }

    fn item_id(&self, item: &Item) -> Result<Value> {
        match item {
            Item::Vertex(id) => Ok(json!(id)),
            Item::Edge(id) => Ok(edge_id_value(*id)),
            Item::VertexProperty { property, .. } => Ok(json!(property)),
            _ => Err(interpretation_error("id() requires an element")),
        }
    }

    fn item_key(&self, item: &Item) -> Result<String> {
        match item {
            Item::VertexProperty { vertex, property } => {
                Ok(self.stored_property(*vertex, *property)?.key.clone())
            }
            Item::EdgeProperty { key, .. } => Ok(key.clone()),
            _ => Err(interpretation_error("key() requires a property")),
        }
    }

    fn item_value(&self, item: &Item) -> Result<Value> {
        match item {
            Item::VertexProperty { vertex, property } => {
                Ok(self.stored_property(*vertex, *property)?.value.clone())
            }
            Item::EdgeProperty { edge, key } => Ok(self
                .edge(*edge)?
                .properties
                .get(key)
                .cloned()
                .unwrap_or(Value::Null)),
            Item::Value(value) => Ok(value.clone()),
            _ => Err(interpretation_error("value() requires a property")),
        }
    }

    fn value_map(&self, item: &Item, with_tokens: bool) -> Result<Value> {
        let mut map = Map::new();
        match item {
            Item::Vertex(id) => {
                let vertex = self.vertex(*id)?;
                for p in &vertex.properties {
                    let entry = map.entry(p.key.clone()).or_insert_with(|| json!([]));
                    if let Value::Array(values) = entry {
                        values.push(p.value.clone());
                    }
                }
                if with_tokens {
                    map.insert("id".to_string(), json!(id));
                    map.insert("label".to_string(), json!(vertex.label));
                }
            }
            Item::Edge(id) => {
                let edge = self.edge(*id)?;
                for (k, v) in &edge.properties {
                    map.insert(k.clone(), v.clone());
                }
                if with_tokens {
                    map.insert("id".to_string(), edge_id_value(*id));
                    map.insert("label".to_string(), json!(edge.label));
                }
            }
            Item::VertexProperty { vertex, property } => {
                let stored = self.stored_property(*vertex, *property)?;
                for (k, v) in &stored.meta {
                    map.insert(k.clone(), v.clone());
                }
                if with_tokens {
                    map.insert("id".to_string(), json!(property));
                    map.insert("key".to_string(), json!(stored.key));
                }
            }
            _ => return Err(interpretation_error("valueMap() requires an element")),
        }
        Ok(Value::Object(map))
    }

    fn project(&mut self, items: &[Item], keys: &[String], modulators: &[&Bytecode]) -> Result<Vec<Item>> {
        let mut projected = Vec::with_capacity(items.len());
        for item in items {
            let mut row = Map::new();
            for (i, key) in keys.iter().enumerate() {
                let value = match modulators.get(i % modulators.len().max(1)) {
                    Some(child) => match self.run(child, Some(vec![item.clone()]))?.first() {
                        Some(result) => self.plain_value(result)?,
                        None => Value::Null,
                    },
                    None => self.plain_value(item)?,
                };
                row.insert(key.clone(), value);
            }
            projected.push(Item::Value(Value::Object(row)));
        }
        Ok(projected)
    }

    fn plain_value(&self, item: &Item) -> Result<Value> {
        match item {
            Item::Value(value) => Ok(value.clone()),
            other => self.item_id(other),
        }
    }

    fn vertex_ref(&self, id: u64, with_label: bool) -> VertexRef {
        VertexRef {
            id: json!(id),
            label: if with_label {
                self.vertices.get(&id).map(|v| v.label.clone())
            } else {
                None
            },
        }
    }

    fn to_result(&self, item: Item, with_labels: bool) -> Result<ResultShape> {
        Ok(match item {
            Item::Vertex(id) => ResultShape::element(GraphElement::Vertex(self.vertex_ref(id, with_labels))),
            Item::Edge(id) => {
                let edge = self.edge(id)?;
                ResultShape::element(GraphElement::Edge(EdgeRef {
                    id: edge_id_value(id),
                    label: edge.label.clone(),
                    out_v: self.vertex_ref(edge.out_v, with_labels),
                    in_v: self.vertex_ref(edge.in_v, with_labels),
                }))
            }
            Item::VertexProperty { vertex, property } => {
                let stored = self.stored_property(vertex, property)?;
                ResultShape::element(GraphElement::VertexProperty(VertexPropertyRef {
                    id: json!(property),
                    key: stored.key.clone(),
                    value: stored.value.clone(),
                }))
            }
            Item::EdgeProperty { edge, key } => {
                let value = self.item_value(&Item::EdgeProperty {
                    edge,
                    key: key.clone(),
                })?;
                ResultShape::value(ResultShape::from_json(json!({ key: value })))
            }
            Item::Value(value) => ResultShape::value(ResultShape::from_json(value)),
        })
    }
}

/// Executor backed by an in-process property graph
#[derive(Debug)]
pub struct InMemoryExecutor {
    graph: Mutex<MemoryGraph>,
    submissions: Mutex<Vec<Bytecode>>,
    vertex_labels: bool,
}

impl Default for InMemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryExecutor {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            graph: Mutex::new(MemoryGraph::default()),
            submissions: Mutex::new(Vec::new()),
            vertex_labels: true,
        }
    }

    /// Emit vertex references without labels, like protocols that only send ids
    pub fn without_vertex_labels(mut self) -> Self {
        self.vertex_labels = false;
        self
    }

    /// Every bytecode submitted so far, in order
    pub fn submissions(&self) -> Vec<Bytecode> {
        self.submissions.lock().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn clear_submissions(&self) {
        self.submissions.lock().clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.lock().vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.lock().edges.len()
    }

    fn execute(&self, bytecode: &Bytecode) -> Result<Vec<ResultShape>> {
        let mut graph = self.graph.lock();
        let items = graph.run(bytecode, None)?;
        items
            .into_iter()
            .map(|item| graph.to_result(item, self.vertex_labels))
            .collect()
    }
}

#[async_trait]
impl RemoteExecutor for InMemoryExecutor {
    async fn submit(&self, bytecode: Bytecode) -> Result<RemoteTraversal> {
        debug!("In-memory submit: {}", bytecode.to_json_string());
        self.submissions.lock().push(bytecode.clone());
        let results = self.execute(&bytecode)?;
        Ok(RemoteTraversal {
            traversers: TraverserStream::from_results(results.into_iter().map(Ok).collect()),
            side_effects: SideEffects::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::{anon, Binding, Traversal};

    fn add_person(executor: &InMemoryExecutor, name: &str) -> Value {
        let bytecode = Traversal::new()
            .add_v("person")
            .property("name", Value::from(name), Vec::new())
            .into_bytecode();
        let results = executor.execute(&bytecode).unwrap();
        results[0].as_element().unwrap().id().clone()
    }

    #[test]
    fn test_add_and_lookup_vertex() {
        let executor = InMemoryExecutor::new();
        let id = add_person(&executor, "Alice");

        let results = executor
            .execute(&Traversal::new().v_id(Binding::vertex_id(id.clone())).value_map(true).into_bytecode())
            .unwrap();
        assert_eq!(
            results[0].to_json(),
            Some(json!({"id": id, "label": "person", "name": ["Alice"]}))
        );
    }

    #[test]
    fn test_cardinality_handling() {
        let executor = InMemoryExecutor::new();
        let id = add_person(&executor, "Alice");
        let vid = || Binding::vertex_id(id.clone());

        let bytecode = Traversal::new()
            .v_id(vid())
            .property_with_cardinality(Cardinality::List, "tag", Value::from("a"), Vec::new())
            .property_with_cardinality(Cardinality::List, "tag", Value::from("a"), Vec::new())
            .property_with_cardinality(Cardinality::Set, "color", Value::from("red"), Vec::new())
            .property_with_cardinality(Cardinality::Set, "color", Value::from("red"), Vec::new())
            .property("name", Value::from("Bob"), Vec::new())
            .into_bytecode();
        executor.execute(&bytecode).unwrap();

        let map = executor
            .execute(&Traversal::new().v_id(vid()).value_map(false).into_bytecode())
            .unwrap()[0]
            .to_json()
            .unwrap();
        assert_eq!(map["tag"], json!(["a", "a"]));
        assert_eq!(map["color"], json!(["red"]));
        assert_eq!(map["name"], json!(["Bob"]));
    }

    #[test]
    fn test_project_vertex_properties_with_meta() {
        let executor = InMemoryExecutor::new();
        let id = add_person(&executor, "Alice");
        executor
            .execute(
                &Traversal::new()
                    .v_id(Binding::vertex_id(id.clone()))
                    .property_with_cardinality(
                        Cardinality::List,
                        "email",
                        Value::from("a@x"),
                        vec![Arg::from("primary"), Arg::Value(json!(true))],
                    )
                    .into_bytecode(),
            )
            .unwrap();

        let rows: Vec<Value> = executor
            .execute(
                &Traversal::new()
                    .v_id(Binding::vertex_id(id))
                    .properties()
                    .project(&["id", "key", "value", "meta"])
                    .by(anon::id())
                    .by(anon::key())
                    .by(anon::value())
                    .by(anon::value_map())
                    .into_bytecode(),
            )
            .unwrap()
            .iter()
            .filter_map(ResultShape::to_json)
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["key"], json!("name"));
        assert_eq!(rows[0]["meta"], json!({}));
        assert_eq!(rows[1]["value"], json!("a@x"));
        assert_eq!(rows[1]["meta"], json!({"primary": true}));
    }

    #[test]
    fn test_edges_and_cascade_drop() {
        let executor = InMemoryExecutor::new();
        let alice = add_person(&executor, "Alice");
        let bob = add_person(&executor, "Bob");

        let results = executor
            .execute(
                &Traversal::new()
                    .v_id(Binding::source_id(alice.clone()))
                    .add_e("knows")
                    .to(anon::v_id(Binding::target_id(bob)))
                    .property("since", Value::from(2001), Vec::new())
                    .into_bytecode(),
            )
            .unwrap();
        let edge = results[0].as_element().unwrap().clone();
        assert!(edge.id().get("relationId").is_some());
        assert_eq!(executor.edge_count(), 1);

        executor
            .execute(&Traversal::new().v_id(Binding::vertex_id(alice)).drop().into_bytecode())
            .unwrap();
        assert_eq!(executor.vertex_count(), 1);
        assert_eq!(executor.edge_count(), 0);
    }

    #[test]
    fn test_edge_property_label_is_its_key() {
        let executor = InMemoryExecutor::new();
        let alice = add_person(&executor, "Alice");
        let bob = add_person(&executor, "Bob");
        let results = executor
            .execute(
                &Traversal::new()
                    .v_id(Binding::source_id(alice))
                    .add_e("knows")
                    .to(anon::v_id(Binding::target_id(bob)))
                    .property("since", Value::from(2001), Vec::new())
                    .into_bytecode(),
            )
            .unwrap();
        let edge_id = results[0].as_element().unwrap().id().clone();

        let labels = executor
            .execute(
                &Traversal::new()
                    .e_id(Binding::edge_id(edge_id.clone()))
                    .properties()
                    .label()
                    .into_bytecode(),
            )
            .unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].to_json(), Some(json!("since")));

        let kept = executor
            .execute(
                &Traversal::new()
                    .e_id(Binding::edge_id(edge_id))
                    .properties()
                    .has_label("since")
                    .into_bytecode(),
            )
            .unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_edge_rejects_meta_properties() {
        let executor = InMemoryExecutor::new();
        let a = add_person(&executor, "A");
        let b = add_person(&executor, "B");
        let err = executor
            .execute(
                &Traversal::new()
                    .v_id(Binding::source_id(a))
                    .add_e("knows")
                    .to(anon::v_id(Binding::target_id(b)))
                    .property("since", Value::from(1), vec![Arg::from("m"), Arg::Value(json!(1))])
                    .into_bytecode(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
    }

    #[test]
    fn test_labels_can_be_omitted() {
        let executor = InMemoryExecutor::new().without_vertex_labels();
        add_person(&executor, "Alice");
        let results = executor.execute(&Traversal::new().v().into_bytecode()).unwrap();
        assert_eq!(results[0].as_element().unwrap().label(), None);
    }

    #[tokio::test]
    async fn test_submit_records_bytecode() {
        let executor = InMemoryExecutor::new();
        let result = executor
            .next(Traversal::new().add_v("person").into_bytecode())
            .await
            .unwrap();
        assert!(result.unwrap().as_element().is_some());
        assert_eq!(executor.submission_count(), 1);
        assert!(matches!(executor.submissions()[0].steps[0], Step::AddV(_)));
    }
}
