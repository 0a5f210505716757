// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Consumer-facing result streams
//!
//! Every submission gets a background drain task that reads the executor's
//! raw stream, resolves each result through the owning session and forwards
//! it, in arrival order, to a [`ResultSet`]. A failing stream forwards one
//! error marker and then ends.

use std::sync::Weak;
use tokio::sync::mpsc;

use super::SessionInner;
use crate::error::{Error, Result};
use crate::executor::{SideEffects, TraverserStream};
use crate::traversal::ResultShape;

#[derive(Debug)]
pub(crate) enum Message {
    Item(ResultShape),
    Error(Error),
    End,
}

/// Resolved results of one submission, in executor order
#[derive(Debug)]
pub struct ResultSet {
    rx: mpsc::Receiver<Message>,
    done: bool,
}

impl ResultSet {
    pub(crate) fn channel(capacity: usize) -> (mpsc::Sender<Message>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx, done: false })
    }

    /// Next resolved result; `None` at end of stream
    ///
    /// A stream whose drain task was cancelled before finishing yields a
    /// `ClosedSession` error, then ends.
    pub async fn one(&mut self) -> Option<Result<ResultShape>> {
        if self.done {
            return None;
        }
        match self.rx.recv().await {
            Some(Message::Item(shape)) => Some(Ok(shape)),
            Some(Message::Error(e)) => Some(Err(e)),
            Some(Message::End) => {
                self.done = true;
                None
            }
            None => {
                self.done = true;
                Some(Err(Error::ClosedSession))
            }
        }
    }

    /// Every remaining result; fails on the first error marker
    pub async fn all(mut self) -> Result<Vec<ResultShape>> {
        let mut results = Vec::new();
        while let Some(result) = self.one().await {
            results.push(result?);
        }
        Ok(results)
    }
}

/// Resolved results plus the executor's side effects
#[derive(Debug)]
pub struct ResolvedTraversal {
    pub results: ResultSet,
    pub side_effects: SideEffects,
}

/// Drain a raw stream into a consumer channel
pub(crate) async fn receive(
    session: Weak<SessionInner>,
    mut traversers: TraverserStream,
    tx: mpsc::Sender<Message>,
) {
    loop {
        let outcome = match traversers.next().await {
            None => {
                let _ = tx.send(Message::End).await;
                return;
            }
            Some(Ok(shape)) => match session.upgrade() {
                Some(inner) => inner.resolve_shape(shape).await,
                None => Err(Error::ClosedSession),
            },
            Some(Err(e)) => Err(e),
        };

        match outcome {
            Ok(shape) => {
                if tx.send(Message::Item(shape)).await.is_err() {
                    // Consumer dropped the result set
                    return;
                }
            }
            Err(e) => {
                if let Some(inner) = session.upgrade() {
                    inner.observer.stream_error(inner.id, &e);
                }
                if tx.send(Message::Error(e)).await.is_ok() {
                    let _ = tx.send(Message::End).await;
                }
                return;
            }
        }
    }
}
