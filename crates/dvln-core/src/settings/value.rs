//! Typed setting values and layer coercion

use serde::Serialize;
use std::fmt;

/// Declared type of a setting, taken from its default value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Str,
}

/// A concrete setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    /// The declared type of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Str(_) => ValueKind::Str,
        }
    }

    /// Zero value for a type: `false`, `0` or `""`
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::Int(0),
            ValueKind::Str => Value::Str(String::new()),
        }
    }

    /// Parse a raw string (environment, command line) as the given type
    pub fn parse_as(kind: ValueKind, raw: &str) -> Option<Self> {
        match kind {
            ValueKind::Bool => parse_bool(raw).map(Value::Bool),
            ValueKind::Int => raw.trim().parse::<i64>().ok().map(Value::Int),
            ValueKind::Str => Some(Value::Str(raw.to_string())),
        }
    }

    /// Convert a config file value to the given type
    ///
    /// Only scalars convert; arrays, objects and null are rejected.
    pub fn from_json(kind: ValueKind, raw: &serde_json::Value) -> Option<Self> {
        match raw {
            serde_json::Value::Bool(b) => Value::Bool(*b).coerce(kind),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i).coerce(kind),
                None if kind == ValueKind::Str => Some(Value::Str(n.to_string())),
                None => None,
            },
            serde_json::Value::String(s) => Value::parse_as(kind, s),
            _ => None,
        }
    }

    /// Convert this value to another type if it has a sensible reading there
    pub fn coerce(self, kind: ValueKind) -> Option<Self> {
        match (self, kind) {
            (v, k) if v.kind() == k => Some(v),
            (Value::Bool(b), ValueKind::Int) => Some(Value::Int(i64::from(b))),
            (Value::Int(i), ValueKind::Bool) => match i {
                0 => Some(Value::Bool(false)),
                1 => Some(Value::Bool(true)),
                _ => None,
            },
            (Value::Str(s), k) => Value::parse_as(k, &s),
            (v, ValueKind::Str) => Some(Value::Str(v.to_string())),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Boolean spellings accepted from the environment and config files
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
