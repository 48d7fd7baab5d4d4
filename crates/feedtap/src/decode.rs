// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Best-effort JSON decoding for captured bodies.

use serde_json::Value;

use crate::types::{FeedError, FeedResult};

/// Decode a raw chunk, tolerating non-JSON framing before the payload.
///
/// Tries the whole chunk first, then restarts at the first `{`, then at the
/// first `[`. When every attempt fails the error from the direct parse is
/// returned.
pub fn decode_resilient(raw: &str) -> FeedResult<Value> {
    let direct = match serde_json::from_str(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for opener in ['{', '['] {
        if let Some(idx) = raw.find(opener) {
            if let Ok(value) = serde_json::from_str(&raw[idx..]) {
                return Ok(value);
            }
        }
    }

    Err(FeedError::Decode(direct))
}
