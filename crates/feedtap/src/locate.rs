// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Locate the feed-unit edge collection inside a decoded payload.
//!
//! Timeline queries usually answer with `data.node.timeline_list_feed_units`,
//! but some query variants nest the same collection deeper or under a
//! different root. The exact path is tried first; a depth-first search for the
//! `timeline_list_feed_units` key is the fallback.

use serde_json::Value;

use crate::path::resolve;

/// Key that marks the feed-unit collection.
pub const FEED_UNITS_KEY: &str = "timeline_list_feed_units";

const PRIMARY_PATH: &[&str] = &["data", "node", FEED_UNITS_KEY, "edges"];

/// Return the feed-unit edges in `payload`, or an empty slice.
///
/// An empty result is normal: most captured responses are unrelated queries
/// that only matched the capture pre-filter.
pub fn locate_edges(payload: &Value) -> &[Value] {
    if let Some(edges) = non_empty_edges(resolve(payload, PRIMARY_PATH)) {
        return edges;
    }
    search_feed_units(payload).unwrap_or(&[])
}

fn non_empty_edges(value: Option<&Value>) -> Option<&[Value]> {
    value
        .and_then(Value::as_array)
        .filter(|edges| !edges.is_empty())
        .map(Vec::as_slice)
}

/// Depth-first search for the first feed-unit key with non-empty edges.
///
/// Object entries are visited in document order and each entry's subtree is
/// fully explored before its later siblings. A feed-unit key whose edges are
/// missing or empty is not descended into.
fn search_feed_units(root: &Value) -> Option<&[Value]> {
    let mut stack: Vec<(Option<&str>, &Value)> = vec![(None, root)];

    while let Some((key, value)) = stack.pop() {
        if key == Some(FEED_UNITS_KEY) {
            if let Some(edges) = non_empty_edges(value.get("edges")) {
                return Some(edges);
            }
            continue;
        }
        match value {
            // Reverse so the first entry is popped first.
            Value::Object(map) => {
                let entries: Vec<_> = map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect();
                stack.extend(entries.into_iter().rev());
            }
            Value::Array(items) => {
                stack.extend(items.iter().rev().map(|v| (None, v)));
            }
            _ => {}
        }
    }

    None
}
