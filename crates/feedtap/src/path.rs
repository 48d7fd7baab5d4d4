// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Accessor paths over loosely-typed JSON.
//!
//! The upstream API exposes the same logical field under different nestings
//! depending on the query variant. Each output field therefore carries an
//! ordered list of [`FieldPath`]s; the first one that resolves to a value of
//! the expected [`Kind`] wins.
//!
//! A path miss is `None`. A path that reaches an explicit JSON `null` resolves
//! to `Some(&Value::Null)`, so callers can tell the two apart; candidate
//! matching treats both as "keep looking".

use serde_json::Value;

/// Expected kind of the value at the end of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Any non-null value.
    Any,
    /// A non-empty string.
    Text,
    /// A JSON number.
    Number,
    /// A number or a non-empty string (counts, identifiers).
    Scalar,
    /// An object.
    Object,
    /// An array.
    Array,
}

impl Kind {
    pub fn admits(self, value: &Value) -> bool {
        match self {
            Kind::Any => !value.is_null(),
            Kind::Text => value.as_str().is_some_and(|s| !s.is_empty()),
            Kind::Number => value.is_number(),
            Kind::Scalar => {
                value.is_number() || value.as_str().is_some_and(|s| !s.is_empty())
            }
            Kind::Object => value.is_object(),
            Kind::Array => value.is_array(),
        }
    }
}

/// A sequence of key steps plus the kind expected at the end.
///
/// A step that parses as an integer indexes into an array when the current
/// value is an array; otherwise every step is an object key.
#[derive(Debug, Clone, Copy)]
pub struct FieldPath {
    pub steps: &'static [&'static str],
    pub kind: Kind,
}

impl FieldPath {
    pub const fn new(steps: &'static [&'static str], kind: Kind) -> Self {
        Self { steps, kind }
    }

    /// Follow the path and return the value at its end if it has the
    /// expected kind.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        resolve(root, self.steps).filter(|v| self.kind.admits(v))
    }
}

/// Follow `steps` from `root`. Missing intermediates are a miss, never a panic.
pub fn resolve<'a>(root: &'a Value, steps: &[&str]) -> Option<&'a Value> {
    steps.iter().try_fold(root, |current, step| match current {
        Value::Object(map) => map.get(*step),
        Value::Array(items) => step.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Evaluate candidates in order and return the first match.
pub fn first_match<'a>(root: &'a Value, candidates: &[FieldPath]) -> Option<&'a Value> {
    candidates.iter().find_map(|path| path.get(root))
}

/// First matching candidate as an owned string. Numbers are rendered in their
/// JSON form so numeric identifiers survive.
pub fn first_string(root: &Value, candidates: &[FieldPath]) -> Option<String> {
    first_match(root, candidates).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Short name of a value's JSON type, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
