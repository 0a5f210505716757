// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Identity map and pending-write queue

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::element::ElementRef;

/// Canonical, hashable form of a backend identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashableId(String);

impl HashableId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts a raw backend identifier into its identity-map key
pub type HashableIdFn = Arc<dyn Fn(&Value) -> HashableId + Send + Sync>;

/// Default canonicalizer: compact JSON text of the identifier
///
/// Object keys serialize in sorted order, so structured edge identifiers
/// that are equal produce the same key regardless of field order.
pub fn canonical_id(id: &Value) -> HashableId {
    HashableId(id.to_string())
}

pub fn default_hashable_id() -> HashableIdFn {
    Arc::new(canonical_id)
}

/// Mutable state owned by one session
#[derive(Debug, Default)]
pub(crate) struct UnitOfWork {
    current: HashMap<HashableId, ElementRef>,
    pending: VecDeque<ElementRef>,
}

impl UnitOfWork {
    pub(crate) fn resolve(&self, id: &HashableId) -> Option<ElementRef> {
        self.current.get(id).cloned()
    }

    pub(crate) fn put(&mut self, id: HashableId, element: ElementRef) {
        self.current.insert(id, element);
    }

    pub(crate) fn evict(&mut self, id: &HashableId) -> Option<ElementRef> {
        self.current.remove(id)
    }

    pub(crate) fn tracked_len(&self) -> usize {
        self.current.len()
    }

    pub(crate) fn enqueue(&mut self, elements: impl IntoIterator<Item = ElementRef>) {
        self.pending.extend(elements);
    }

    pub(crate) fn pop_pending(&mut self) -> Option<ElementRef> {
        self.pending.pop_front()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Discard tracked objects and queued writes
    pub(crate) fn clear(&mut self) {
        self.current.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::mapping::Mapping;
    use serde_json::json;

    fn vertex() -> ElementRef {
        ElementRef::new(Element::new(Arc::new(Mapping::vertex("person"))))
    }

    #[test]
    fn test_canonical_id_ignores_field_order() {
        let a: Value = serde_json::from_str(r#"{"relationId": "1", "type": "knows"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"type": "knows", "relationId": "1"}"#).unwrap();
        assert_eq!(canonical_id(&a), canonical_id(&b));
        assert_ne!(canonical_id(&json!(1)), canonical_id(&json!("1")));
    }

    #[test]
    fn test_resolve_returns_same_object() {
        let mut uow = UnitOfWork::default();
        let element = vertex();
        uow.put(canonical_id(&json!(1)), element.clone());

        let found = uow.resolve(&canonical_id(&json!(1))).unwrap();
        assert!(ElementRef::ptr_eq(&found, &element));
        assert!(uow.resolve(&canonical_id(&json!(2))).is_none());

        assert!(uow.evict(&canonical_id(&json!(1))).is_some());
        assert_eq!(uow.tracked_len(), 0);
    }

    #[test]
    fn test_pending_queue_is_fifo() {
        let mut uow = UnitOfWork::default();
        let (a, b) = (vertex(), vertex());
        uow.enqueue([a.clone(), b.clone()]);
        assert_eq!(uow.pending_len(), 2);

        assert!(ElementRef::ptr_eq(&uow.pop_pending().unwrap(), &a));
        uow.enqueue([a.clone()]);
        assert!(ElementRef::ptr_eq(&uow.pop_pending().unwrap(), &b));
        assert!(ElementRef::ptr_eq(&uow.pop_pending().unwrap(), &a));
        assert!(uow.pop_pending().is_none());
    }
}
