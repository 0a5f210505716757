// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for graphogm

use thiserror::Error;

use crate::mapping::ElementKind;

/// Result type alias for OGM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Structural problems with a domain object, detected before any remote call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    /// The element kind cannot be persisted by this operation
    #[error("Unknown element type: {0}")]
    UnknownKind(ElementKind),

    /// Edge saves need both endpoints
    #[error("Edges require both source/target vertices")]
    MissingEndpoints,

    /// An endpoint was set but never persisted
    #[error("Edge {0} vertex has no backend identifier")]
    UnsavedEndpoint(&'static str),

    /// Operation needs a backend identifier the object does not have
    #[error("{0} has no backend identifier")]
    MissingId(ElementKind),

    /// Operation received an element of the wrong kind
    #[error("Expected a {expected}, got a {actual}")]
    KindMismatch {
        expected: ElementKind,
        actual: ElementKind,
    },
}

/// Main error type for graphogm operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Structurally invalid domain object for the requested operation
    #[error("Element error: {0}")]
    Element(#[from] ElementError),

    /// Operation attempted after the unit of work was closed
    #[error("Session is closed")]
    ClosedSession,

    /// Attribute could not be translated to a backend property name
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Failure surfaced by the remote query executor
    #[error("Remote execution error: {0}")]
    Remote(String),

    /// Value could not be coerced by a property data type
    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Convenience constructor for remote failures
    pub fn remote(msg: impl Into<String>) -> Self {
        Error::Remote(msg.into())
    }

    /// True for structural element errors
    pub fn is_element_error(&self) -> bool {
        matches!(self, Error::Element(_))
    }

    /// True when the session had already been closed
    pub fn is_closed_session(&self) -> bool {
        matches!(self, Error::ClosedSession)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
