// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Response filter: decides which intercepted network bodies are worth keeping.
//!
//! The check is two-phase. The URL test runs before the body is fetched, so
//! unrelated traffic (images, telemetry, ads config) never has its body read.
//! The marker test runs on the body after the anti-execution prefix is
//! removed and is only a cheap pre-filter: plenty of accepted bodies turn out
//! to hold no feed units at all.

/// Substring that identifies the internal data-fetch endpoint.
pub const API_PATH_MARKER: &str = "graphql";

/// Prefix some responses carry to stop them being executed as a script.
pub const ANTI_EXECUTION_PREFIX: &str = "for (;;);";

/// Substrings indicating feed-relevant content.
pub const FEED_MARKERS: &[&str] = &["comment", "story", "feedback", "timeline_list_feed_units"];

/// URL and body pre-filter for captured responses.
#[derive(Debug, Clone)]
pub struct ResponseFilter {
    url_marker: String,
    prefix: String,
    markers: Vec<String>,
}

impl Default for ResponseFilter {
    fn default() -> Self {
        Self::new(
            API_PATH_MARKER,
            ANTI_EXECUTION_PREFIX,
            FEED_MARKERS.iter().copied(),
        )
    }
}

impl ResponseFilter {
    pub fn new<'a>(
        url_marker: &str,
        prefix: &str,
        markers: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            url_marker: url_marker.to_string(),
            prefix: prefix.to_string(),
            markers: markers.into_iter().map(String::from).collect(),
        }
    }

    /// Whether an exchange with this URL is a capture candidate.
    pub fn matches_url(&self, url: &str) -> bool {
        url.contains(&self.url_marker)
    }

    /// Remove the anti-execution prefix if it sits at offset 0.
    pub fn strip_prefix<'a>(&self, body: &'a str) -> &'a str {
        body.strip_prefix(self.prefix.as_str()).unwrap_or(body)
    }

    /// Whether the (already stripped) body mentions any feed marker.
    pub fn has_feed_marker(&self, body: &str) -> bool {
        self.markers.iter().any(|m| body.contains(m.as_str()))
    }

    /// Full decision for one exchange: returns the stripped body to persist,
    /// or `None` if the exchange should be dropped.
    pub fn accept<'a>(&self, url: &str, body: &'a str) -> Option<&'a str> {
        if !self.matches_url(url) {
            return None;
        }
        let body = self.strip_prefix(body);
        self.has_feed_marker(body).then_some(body)
    }
}
