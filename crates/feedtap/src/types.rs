// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data types for normalized feed records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typename assumed for feed units that do not carry `__typename`.
pub const DEFAULT_POST_TYPE: &str = "Story";

/// A feed post in fixed shape, regardless of how the upstream payload nested it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPost {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub owner: Option<String>,
    /// Epoch as it appeared upstream, fractional seconds included.
    pub publish_time: Option<serde_json::Number>,
    pub comment_count: Count,
    pub share_count: Count,
    pub view_count: serde_json::Number,
    pub reactions: BTreeMap<String, Count>,
    pub attachments: Vec<AttachmentRecord>,
}

impl Default for NormalizedPost {
    fn default() -> Self {
        Self {
            id: None,
            kind: DEFAULT_POST_TYPE.to_string(),
            text: String::new(),
            owner: None,
            publish_time: None,
            comment_count: Count::ZERO,
            share_count: Count::ZERO,
            view_count: serde_json::Number::from(0u64),
            reactions: BTreeMap::new(),
            attachments: Vec::new(),
        }
    }
}

/// Media attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Outcome of permissive count coercion.
///
/// Upstream counts arrive as numbers, digit-strings, or occasionally as
/// something else entirely (localized strings such as `"1.2K"`). Values that
/// cannot be coerced are kept verbatim as `Raw` rather than dropped, so
/// consumers can tell a real count from a passthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Coerced(u64),
    Raw(Value),
}

impl Count {
    pub const ZERO: Count = Count::Coerced(0);

    /// Coerce a raw upstream value. `None` (path miss) counts as zero.
    pub fn coerce(raw: Option<&Value>) -> Self {
        let Some(raw) = raw else {
            return Count::ZERO;
        };
        match raw {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    return Count::Coerced(v);
                }
                match n.as_f64() {
                    Some(f) if f == 0.0 => Count::ZERO,
                    Some(f) if f > 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
                        Count::Coerced(f as u64)
                    }
                    _ => Count::Raw(raw.clone()),
                }
            }
            Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
                .parse::<u64>()
                .map(Count::Coerced)
                .unwrap_or_else(|_| Count::Raw(raw.clone())),
            _ if is_falsy(raw) => Count::ZERO,
            _ => Count::Raw(raw.clone()),
        }
    }

    /// The coerced integer, if coercion succeeded.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Count::Coerced(v) => Some(*v),
            Count::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Count::Raw(_))
    }
}

impl Default for Count {
    fn default() -> Self {
        Count::ZERO
    }
}

impl From<u64> for Count {
    fn from(v: u64) -> Self {
        Count::Coerced(v)
    }
}

/// Values the upstream treats as "no data": null, false, empty string, zero,
/// empty containers.
pub(crate) fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Errors that can occur in the feed library.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(serde_json::Error),

    #[error("Malformed edge: {0}")]
    MalformedEdge(String),

    #[error("Malformed attachment: {0}")]
    MalformedAttachment(String),
}

/// Convenience result type.
pub type FeedResult<T> = Result<T, FeedError>;
