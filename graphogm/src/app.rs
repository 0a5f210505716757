// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Application handle
//!
//! [`Ogm`] holds what every session borrows from the application: the remote
//! executor, the mapping registry, the identifier canonicalizer, the session
//! configuration and the event observer.

use serde_json::Value;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::executor::RemoteExecutor;
use crate::mapping::Registry;
use crate::session::{default_hashable_id, HashableId, HashableIdFn, LogObserver, Session, SessionObserver};

/// Entry point that opens sessions against one executor
#[derive(Clone)]
pub struct Ogm {
    executor: Arc<dyn RemoteExecutor>,
    registry: Arc<Registry>,
    hashable_id: HashableIdFn,
    config: SessionConfig,
    observer: Arc<dyn SessionObserver>,
}

impl std::fmt::Debug for Ogm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ogm")
            .field("registered_types", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Ogm {
    /// Create a handle with default configuration and log-based observation
    pub fn new(executor: Arc<dyn RemoteExecutor>, registry: Registry) -> Self {
        Self {
            executor,
            registry: Arc::new(registry),
            hashable_id: default_hashable_id(),
            config: SessionConfig::default(),
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the identifier canonicalizer; it must never fail
    pub fn with_hashable_id<F>(mut self, hashable_id: F) -> Self
    where
        F: Fn(&Value) -> HashableId + Send + Sync + 'static,
    {
        self.hashable_id = Arc::new(hashable_id);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn executor(&self) -> &Arc<dyn RemoteExecutor> {
        &self.executor
    }

    /// Open a fresh unit of work
    pub fn session(&self) -> Session {
        Session::new(
            Arc::clone(&self.executor),
            Arc::clone(&self.registry),
            Arc::clone(&self.hashable_id),
            self.config.clone(),
            Arc::clone(&self.observer),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InMemoryExecutor;
    use crate::mapping::Mapping;

    #[test]
    fn test_sessions_are_independent() {
        let mut registry = Registry::new();
        registry.register(Mapping::vertex("person"));
        let ogm = Ogm::new(Arc::new(InMemoryExecutor::new()), registry);

        let a = ogm.session();
        let b = ogm.session();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.registry().len(), 1);
        assert!(!a.is_closed());
    }

    #[test]
    fn test_custom_hashable_id() {
        let ogm = Ogm::new(Arc::new(InMemoryExecutor::new()), Registry::new())
            .with_hashable_id(|id| HashableId::new(format!("id:{}", id)));
        let session = ogm.session();
        assert!(session.current(&serde_json::json!(1)).is_none());
    }
}
