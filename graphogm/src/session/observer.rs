// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session event observation
//!
//! Sessions report notable events to an injected [`SessionObserver`] instead
//! of writing to a process-wide logger. [`LogObserver`] forwards them to the
//! `log` facade.

use log::{debug, info, warn};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::Error;
use crate::mapping::ElementKind;

/// Which branch of check-then-act a save took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePath {
    Create,
    Update,
}

impl fmt::Display for WritePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePath::Create => write!(f, "create"),
            WritePath::Update => write!(f, "update"),
        }
    }
}

/// Receives session events; every method defaults to doing nothing
pub trait SessionObserver: Send + Sync {
    /// A save chose its write path
    fn write_path(&self, _session: Uuid, _kind: ElementKind, _path: WritePath) {}

    /// A removed element was not tracked by the session
    fn untracked_removal(&self, _session: Uuid, _kind: ElementKind, _id: &Value) {}

    /// A result stream ended with an error
    fn stream_error(&self, _session: Uuid, _error: &Error) {}

    /// The session was closed; `cancelled` drain tasks were still running
    fn session_closed(&self, _session: Uuid, _cancelled: usize) {}
}

/// Forwards session events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn write_path(&self, session: Uuid, kind: ElementKind, path: WritePath) {
        debug!("Session {}: saving {} via {} path", session, kind, path);
    }

    fn untracked_removal(&self, session: Uuid, kind: ElementKind, id: &Value) {
        warn!(
            "Session {}: removed {} {} does not belong to this session",
            session, kind, id
        );
    }

    fn stream_error(&self, session: Uuid, error: &Error) {
        warn!("Session {}: result stream failed: {}", session, error);
    }

    fn session_closed(&self, session: Uuid, cancelled: usize) {
        if cancelled > 0 {
            info!(
                "Session {} closed, cancelled {} in-flight result streams",
                session, cancelled
            );
        } else {
            debug!("Session {} closed", session);
        }
    }
}
