// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Remote query executor contract
//!
//! The transport to the graph engine lives outside this crate. A session
//! only needs something that accepts bytecode and hands back an async
//! sequence of raw results. [`memory::InMemoryExecutor`] is a reference
//! implementation backed by an in-process graph.

pub mod memory;

pub use memory::InMemoryExecutor;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::traversal::{Bytecode, ResultShape};

/// Async sequence of raw results for one submission
#[derive(Debug)]
pub struct TraverserStream {
    rx: mpsc::Receiver<Result<ResultShape>>,
}

impl TraverserStream {
    /// Create a stream and the sender that feeds it
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<ResultShape>>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }

    /// Stream over results that are already available
    pub fn from_results(results: Vec<Result<ResultShape>>) -> Self {
        let (tx, stream) = Self::channel(results.len());
        for result in results {
            // Capacity covers every item, so try_send cannot fill up
            if tx.try_send(result).is_err() {
                break;
            }
        }
        stream
    }

    /// Next result; `None` once the executor has finished
    pub async fn next(&mut self) -> Option<Result<ResultShape>> {
        self.rx.recv().await
    }

    /// Drain the remaining results, stopping at the first error
    pub async fn collect(mut self) -> Result<Vec<ResultShape>> {
        let mut results = Vec::new();
        while let Some(result) = self.next().await {
            results.push(result?);
        }
        Ok(results)
    }
}

/// Side effects reported alongside a traversal's results
#[derive(Debug, Clone, Default)]
pub struct SideEffects {
    values: HashMap<String, Value>,
}

impl SideEffects {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Results and side effects of one submission
#[derive(Debug)]
pub struct RemoteTraversal {
    pub traversers: TraverserStream,
    pub side_effects: SideEffects,
}

/// Connection to the graph engine
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Submit bytecode and return its result stream
    async fn submit(&self, bytecode: Bytecode) -> Result<RemoteTraversal>;

    /// First result of a traversal, if any
    async fn next(&self, bytecode: Bytecode) -> Result<Option<ResultShape>> {
        let mut traversal = self.submit(bytecode).await?;
        traversal.traversers.next().await.transpose()
    }

    /// Every result of a traversal
    async fn to_list(&self, bytecode: Bytecode) -> Result<Vec<ResultShape>> {
        let traversal = self.submit(bytecode).await?;
        traversal.traversers.collect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[tokio::test]
    async fn test_stream_from_results() {
        let stream = TraverserStream::from_results(vec![
            Ok(ResultShape::Scalar(json!(1))),
            Ok(ResultShape::Scalar(json!(2))),
        ]);
        let results = stream.collect().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].to_json(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_collect_stops_at_error() {
        let stream = TraverserStream::from_results(vec![
            Ok(ResultShape::Scalar(json!(1))),
            Err(Error::remote("boom")),
            Ok(ResultShape::Scalar(json!(3))),
        ]);
        let err = stream.collect().await.unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
    }

    #[tokio::test]
    async fn test_empty_stream_ends() {
        let mut stream = TraverserStream::from_results(Vec::new());
        assert!(stream.next().await.is_none());
    }
}
