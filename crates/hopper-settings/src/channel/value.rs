//! Typed property values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value stored under a channel key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// 32-bit signed integer.
    Int(i32),
    /// Array of 32-bit signed integers.
    IntArray(Vec<i32>),
    /// UTF-8 string.
    String(String),
}

impl PropertyValue {
    /// The integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The string, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integers, if this is an `IntArray`.
    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::IntArray(_) => "int[]",
            Self::String(_) => "string",
        }
    }

    /// Convert a JSON value, rejecting shapes a channel cannot hold.
    ///
    /// Integers must fit in `i32`; arrays must contain only such integers.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()).map(Self::Int),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_i64().and_then(|v| i32::try_from(v).ok()))
                .collect::<Option<Vec<_>>>()
                .map(Self::IntArray),
            _ => None,
        }
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<i32>> for PropertyValue {
    fn from(v: Vec<i32>) -> Self {
        Self::IntArray(v)
    }
}
