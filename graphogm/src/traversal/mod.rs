// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal construction
//!
//! This module provides:
//! - Typed traversal steps and arguments ([`Step`], [`Arg`])
//! - Serializable bytecode submitted to the remote executor
//! - A fluent [`Traversal`] builder and the [`anon`] child-traversal helpers
//! - [`ParameterBinder`], which names bound parameters for one traversal
//! - Result shapes returned by the executor ([`result`])

pub mod result;

pub use result::{
    EdgeRef, GraphElement, Payload, ResultShape, Traverser, VertexPropertyRef, VertexRef,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::element::PropertyRecord;
use crate::mapping::Cardinality;

/// Named parameter sent alongside the bytecode instead of an inline literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn vertex_id(id: Value) -> Self {
        Self::new("vid", id)
    }

    pub fn edge_id(id: Value) -> Self {
        Self::new("eid", id)
    }

    pub fn source_id(id: Value) -> Self {
        Self::new("sid", id)
    }

    pub fn target_id(id: Value) -> Self {
        Self::new("tid", id)
    }
}

/// Step argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arg {
    Value(Value),
    Binding(Binding),
    Traversal(Bytecode),
}

impl Arg {
    /// Literal or bound value carried by this argument
    pub fn resolve(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            Arg::Binding(binding) => Some(&binding.value),
            Arg::Traversal(_) => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Value(Value::String(value))
    }
}

impl From<Binding> for Arg {
    fn from(binding: Binding) -> Self {
        Arg::Binding(binding)
    }
}

impl From<Traversal> for Arg {
    fn from(traversal: Traversal) -> Self {
        Arg::Traversal(traversal.into_bytecode())
    }
}

/// A single traversal instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    V(Vec<Arg>),
    E(Vec<Arg>),
    AddV(Arg),
    AddE(Arg),
    To(Bytecode),
    HasLabel(Vec<String>),
    Property {
        cardinality: Option<Cardinality>,
        key: Arg,
        value: Arg,
        /// Metadata flattened as alternating key/value arguments
        meta: Vec<Arg>,
    },
    Properties(Vec<String>),
    Drop,
    Label,
    Id,
    Key,
    Value,
    ValueMap {
        with_tokens: bool,
    },
    Project(Vec<String>),
    By(Bytecode),
}

/// Ordered list of steps, the unit submitted to the remote executor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bytecode {
    pub steps: Vec<Step>,
}

impl Bytecode {
    /// All bound parameters in this bytecode and its child traversals
    pub fn bindings(&self) -> BTreeMap<String, Value> {
        let mut bindings = BTreeMap::new();
        self.collect_bindings(&mut bindings);
        bindings
    }

    fn collect_bindings(&self, out: &mut BTreeMap<String, Value>) {
        fn visit(arg: &Arg, out: &mut BTreeMap<String, Value>) {
            match arg {
                Arg::Binding(binding) => {
                    out.insert(binding.name.clone(), binding.value.clone());
                }
                Arg::Traversal(bytecode) => bytecode.collect_bindings(out),
                Arg::Value(_) => {}
            }
        }

        for step in &self.steps {
            match step {
                Step::V(args) | Step::E(args) => args.iter().for_each(|arg| visit(arg, out)),
                Step::AddV(arg) | Step::AddE(arg) => visit(arg, out),
                Step::To(bytecode) | Step::By(bytecode) => bytecode.collect_bindings(out),
                Step::Property {
                    key, value, meta, ..
                } => {
                    visit(key, out);
                    visit(value, out);
                    meta.iter().for_each(|arg| visit(arg, out));
                }
                _ => {}
            }
        }
    }

    /// Compact JSON form for log lines
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Generates unique bound-parameter names within one traversal
#[derive(Debug, Default)]
pub struct ParameterBinder {
    next: usize,
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a property name and value as `k<n>` / `v<n>`
    pub fn bind_pair(&mut self, key: impl Into<Value>, value: Value) -> (Binding, Binding) {
        let n = self.next;
        self.next += 1;
        (
            Binding::new(format!("k{}", n), key),
            Binding::new(format!("v{}", n), value),
        )
    }

    /// Number of pairs issued so far
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Fluent traversal builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traversal {
    bytecode: Bytecode,
}

impl Traversal {
    /// Empty traversal source
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, step: Step) -> Self {
        self.bytecode.steps.push(step);
        self
    }

    /// All vertices
    pub fn v(self) -> Self {
        self.push(Step::V(Vec::new()))
    }

    /// Vertex lookup by identifier
    pub fn v_id(self, id: impl Into<Arg>) -> Self {
        self.push(Step::V(vec![id.into()]))
    }

    /// All edges
    pub fn e(self) -> Self {
        self.push(Step::E(Vec::new()))
    }

    /// Edge lookup by identifier
    pub fn e_id(self, id: impl Into<Arg>) -> Self {
        self.push(Step::E(vec![id.into()]))
    }

    pub fn add_v(self, label: impl Into<Arg>) -> Self {
        self.push(Step::AddV(label.into()))
    }

    pub fn add_e(self, label: impl Into<Arg>) -> Self {
        self.push(Step::AddE(label.into()))
    }

    pub fn to(self, target: Traversal) -> Self {
        self.push(Step::To(target.into_bytecode()))
    }

    pub fn has_label(self, label: impl Into<String>) -> Self {
        self.push(Step::HasLabel(vec![label.into()]))
    }

    /// Plain property-addition step
    pub fn property(self, key: impl Into<Arg>, value: impl Into<Arg>, meta: Vec<Arg>) -> Self {
        self.push(Step::Property {
            cardinality: None,
            key: key.into(),
            value: value.into(),
            meta,
        })
    }

    /// Cardinality-qualified property-addition step
    pub fn property_with_cardinality(
        self,
        cardinality: Cardinality,
        key: impl Into<Arg>,
        value: impl Into<Arg>,
        meta: Vec<Arg>,
    ) -> Self {
        self.push(Step::Property {
            cardinality: Some(cardinality),
            key: key.into(),
            value: value.into(),
            meta,
        })
    }

    /// Apply property records as bound property-addition steps
    ///
    /// Records with a null value are skipped and do not consume a binding.
    pub fn with_properties(self, records: &[PropertyRecord]) -> Self {
        let mut binder = ParameterBinder::new();
        let mut traversal = self;
        for record in records.iter().filter(|record| !record.value.is_null()) {
            let (key, value) = binder.bind_pair(record.key.clone(), record.value.clone());
            let meta = record
                .meta
                .iter()
                .flat_map(|(k, v)| [Arg::from(k.as_str()), Arg::Value(v.clone())])
                .collect();
            traversal = match record.cardinality {
                Some(cardinality) => traversal.property_with_cardinality(cardinality, key, value, meta),
                None => traversal.property(key, value, meta),
            };
        }
        traversal
    }

    pub fn properties(self) -> Self {
        self.push(Step::Properties(Vec::new()))
    }

    pub fn properties_of(self, keys: Vec<String>) -> Self {
        self.push(Step::Properties(keys))
    }

    pub fn drop(self) -> Self {
        self.push(Step::Drop)
    }

    pub fn label(self) -> Self {
        self.push(Step::Label)
    }

    pub fn id(self) -> Self {
        self.push(Step::Id)
    }

    pub fn key(self) -> Self {
        self.push(Step::Key)
    }

    pub fn value(self) -> Self {
        self.push(Step::Value)
    }

    pub fn value_map(self, with_tokens: bool) -> Self {
        self.push(Step::ValueMap { with_tokens })
    }

    pub fn project(self, keys: &[&str]) -> Self {
        self.push(Step::Project(keys.iter().map(|k| k.to_string()).collect()))
    }

    pub fn by(self, child: Traversal) -> Self {
        self.push(Step::By(child.into_bytecode()))
    }

    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    pub fn into_bytecode(self) -> Bytecode {
        self.bytecode
    }
}

impl From<Traversal> for Bytecode {
    fn from(traversal: Traversal) -> Self {
        traversal.into_bytecode()
    }
}

/// Anonymous child traversals
pub mod anon {
    use super::{Arg, Traversal};

    pub fn v_id(id: impl Into<Arg>) -> Traversal {
        Traversal::new().v_id(id)
    }

    pub fn id() -> Traversal {
        Traversal::new().id()
    }

    pub fn key() -> Traversal {
        Traversal::new().key()
    }

    pub fn value() -> Traversal {
        Traversal::new().value()
    }

    pub fn label() -> Traversal {
        Traversal::new().label()
    }

    pub fn value_map() -> Traversal {
        Traversal::new().value_map(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MetaProperties;
    use serde_json::json;

    fn record(cardinality: Option<Cardinality>, key: &str, value: Value) -> PropertyRecord {
        PropertyRecord {
            cardinality,
            key: key.to_string(),
            value,
            meta: MetaProperties::new(),
        }
    }

    #[test]
    fn test_binder_names_are_unique() {
        let mut binder = ParameterBinder::new();
        let (k0, v0) = binder.bind_pair("name", json!("Alice"));
        let (k1, v1) = binder.bind_pair("age", json!(30));
        assert_eq!((k0.name.as_str(), v0.name.as_str()), ("k0", "v0"));
        assert_eq!((k1.name.as_str(), v1.name.as_str()), ("k1", "v1"));
        assert_eq!(binder.issued(), 2);
    }

    #[test]
    fn test_with_properties_skips_nulls_and_flattens_meta() {
        let mut tagged = record(Some(Cardinality::List), "email", json!("a@x"));
        tagged.meta.insert("primary".to_string(), json!(true));
        tagged.meta.insert("since".to_string(), json!(2020));
        let records = vec![
            record(None, "name", json!("Alice")),
            record(None, "nickname", Value::Null),
            tagged,
        ];

        let bytecode = Traversal::new().add_v("person").with_properties(&records).into_bytecode();
        assert_eq!(bytecode.steps.len(), 3);

        match &bytecode.steps[2] {
            Step::Property {
                cardinality,
                key,
                value,
                meta,
            } => {
                assert_eq!(*cardinality, Some(Cardinality::List));
                assert_eq!(key, &Arg::Binding(Binding::new("k1", "email")));
                assert_eq!(value, &Arg::Binding(Binding::new("v1", "a@x")));
                assert_eq!(
                    meta,
                    &vec![
                        Arg::from("primary"),
                        Arg::Value(json!(true)),
                        Arg::from("since"),
                        Arg::Value(json!(2020)),
                    ]
                );
            }
            other => panic!("unexpected step {:?}", other),
        }

        let bindings = bytecode.bindings();
        assert_eq!(bindings.len(), 4);
        assert_eq!(bindings.get("v0"), Some(&json!("Alice")));
        assert!(!bindings.contains_key("k2"));
    }

    #[test]
    fn test_bindings_include_child_traversals() {
        let bytecode = Traversal::new()
            .v_id(Binding::source_id(json!(1)))
            .add_e("knows")
            .to(anon::v_id(Binding::target_id(json!(2))))
            .into_bytecode();
        let bindings = bytecode.bindings();
        assert_eq!(bindings.get("sid"), Some(&json!(1)));
        assert_eq!(bindings.get("tid"), Some(&json!(2)));
    }

    #[test]
    fn test_bytecode_serializes() {
        let bytecode = Traversal::new().v().has_label("person").value_map(true).into_bytecode();
        let json = bytecode.to_json_string();
        assert!(json.contains("has_label"));
        let back: Bytecode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bytecode);
    }
}
