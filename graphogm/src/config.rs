// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session configuration
//!
//! Settings that shape how a unit of work talks to the remote executor and
//! how results are resolved. Loading the configuration from disk is left to
//! the host application; this module only defines the types and a JSON
//! entry point.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How far the result deserializer descends into containers
///
/// Only one level of sequences/mappings is resolved by default. Callers that
/// rely on nested containers staying raw keep working; `Deep` opts into full
/// recursive resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionDepth {
    /// Resolve traversers at the top level and directly inside a top-level
    /// sequence or mapping
    #[default]
    Shallow,

    /// Resolve traversers at any nesting depth
    Deep,
}

impl std::str::FromStr for ResolutionDepth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shallow" => Ok(ResolutionDepth::Shallow),
            "deep" => Ok(ResolutionDepth::Deep),
            _ => Err(format!(
                "Unknown resolution depth: {}. Valid options: shallow, deep",
                s
            )),
        }
    }
}

impl std::fmt::Display for ResolutionDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResolutionDepth::Shallow => "shallow",
            ResolutionDepth::Deep => "deep",
        };
        write!(f, "{}", name)
    }
}

/// Per-session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Capacity of the consumer-facing result channel for each submission
    pub result_buffer: usize,
    /// Container depth handled by the result deserializer
    pub resolution_depth: ResolutionDepth,
    /// Reject attributes that the mapping descriptor does not declare
    pub strict_properties: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            result_buffer: 64,
            resolution_depth: ResolutionDepth::Shallow,
            strict_properties: false,
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from a JSON document; missing fields use defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder-style setter for the resolution depth
    pub fn with_resolution_depth(mut self, depth: ResolutionDepth) -> Self {
        self.resolution_depth = depth;
        self
    }

    /// Builder-style setter for strict property handling
    pub fn with_strict_properties(mut self, strict: bool) -> Self {
        self.strict_properties = strict;
        self
    }

    /// Result channel capacity, never zero
    pub(crate) fn channel_capacity(&self) -> usize {
        self.result_buffer.max(1)
    }
}
