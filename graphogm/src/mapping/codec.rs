// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Property codec
//!
//! Pure conversions between domain attribute values and wire values, plus
//! attribute-name to backend-name resolution.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Mapping;
use crate::error::{Error, Result};

/// Value type descriptor for a declared property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// No coercion
    #[default]
    Any,
    String,
    Integer,
    Float,
    Boolean,
    /// RFC 3339 timestamp in UTC
    DateTime,
}

impl DataType {
    /// Coerce a domain value into its wire representation
    pub fn to_db(self, value: &Value) -> Result<Value> {
        self.coerce(value)
    }

    /// Coerce a wire value into its domain representation
    pub fn to_ogm(self, value: &Value) -> Result<Value> {
        self.coerce(value)
    }

    /// Wire value for a timestamp
    pub fn datetime(dt: DateTime<Utc>) -> Value {
        Value::String(dt.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    fn coerce(self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            DataType::Any => Ok(value.clone()),
            DataType::String => match value {
                Value::String(_) => Ok(value.clone()),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(self.mismatch(value)),
            },
            DataType::Integer => match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| {
                        // i64::MAX as f64 is 2^63, one past the largest i64
                        n.as_f64()
                            .filter(|f| f.fract() == 0.0)
                            .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                            .map(|f| f as i64)
                    })
                    .map(Value::from)
                    .ok_or_else(|| self.mismatch(value)),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| self.mismatch(value)),
                Value::Bool(b) => Ok(Value::from(i64::from(*b))),
                _ => Err(self.mismatch(value)),
            },
            DataType::Float => match value {
                Value::Number(n) => n
                    .as_f64()
                    .map(Value::from)
                    .ok_or_else(|| self.mismatch(value)),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::from)
                    .map_err(|_| self.mismatch(value)),
                Value::Bool(b) => Ok(Value::from(if *b { 1.0 } else { 0.0 })),
                _ => Err(self.mismatch(value)),
            },
            DataType::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
                Value::String(s) => match s.to_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.mismatch(value)),
                },
                _ => Err(self.mismatch(value)),
            },
            DataType::DateTime => match value {
                Value::String(s) => DateTime::parse_from_rfc3339(s)
                    .map(|dt| Self::datetime(dt.with_timezone(&Utc)))
                    .map_err(|e| Error::TypeConversion(format!("invalid timestamp '{}': {}", s, e))),
                Value::Number(n) => n
                    .as_i64()
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                    .map(Self::datetime)
                    .ok_or_else(|| self.mismatch(value)),
                _ => Err(self.mismatch(value)),
            },
        }
    }

    fn mismatch(self, value: &Value) -> Error {
        Error::TypeConversion(format!("cannot convert {} to {:?}", value, self))
    }
}

/// Converts attribute values to and from their backend form
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyCodec {
    strict: bool,
}

impl PropertyCodec {
    /// Codec that falls back to the attribute name for undeclared properties
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Codec that rejects undeclared properties with a mapping error
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Backend property name for a domain attribute
    pub fn resolve_name(&self, mapping: &Mapping, attr: &str) -> Result<String> {
        match mapping.property(attr) {
            Some(def) => Ok(def.db_name.clone()),
            None if self.strict => Err(Error::Mapping(format!(
                "'{}' is not a declared property of {} '{}'",
                attr,
                mapping.kind(),
                mapping.label()
            ))),
            None => Ok(attr.to_string()),
        }
    }

    /// Encode one attribute value into `(backend_name, wire_value)`
    pub fn encode(&self, mapping: &Mapping, attr: &str, value: &Value) -> Result<(String, Value)> {
        let db_name = self.resolve_name(mapping, attr)?;
        let data_type = mapping
            .property(attr)
            .map(|def| def.data_type)
            .unwrap_or_default();
        Ok((db_name, data_type.to_db(value)?))
    }

    /// Decode a wire value with the given type descriptor
    pub fn decode(&self, data_type: DataType, wire: &Value) -> Result<Value> {
        data_type.to_ogm(wire)
    }
}
