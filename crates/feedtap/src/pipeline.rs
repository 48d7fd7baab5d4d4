// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parse stage: raw log → decoded payloads → feed edges → normalized posts.
//!
//! Nothing in a chunk's content can abort the pass. Undecodable chunks are
//! recorded in the report and skipped; edges that are not objects are
//! skipped; everything else normalizes to something.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::decode::decode_resilient;
use crate::locate::locate_edges;
use crate::normalize::normalize_post;
use crate::path::kind_name;
use crate::store::{load_raw_log, write_posts};
use crate::types::{FeedError, FeedResult, NormalizedPost};

/// A chunk that could not be decoded.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkSkip {
    /// Zero-based position of the chunk in the raw log.
    pub index: usize,
    pub reason: String,
}

/// Counters for one parse pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    pub chunks: usize,
    pub decoded: usize,
    pub skipped: Vec<ChunkSkip>,
    pub edges: usize,
    pub posts: usize,
    pub node_errors: usize,
}

/// Posts and counters produced by a parse pass.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub posts: Vec<NormalizedPost>,
    pub report: ParseReport,
}

/// Parse every chunk in order.
pub fn parse_chunks<I, S>(chunks: I) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = ParseOutcome::default();

    for (index, chunk) in chunks.into_iter().enumerate() {
        outcome.report.chunks += 1;

        let payload = match decode_resilient(chunk.as_ref()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("skipping invalid JSON chunk {index}: {e}");
                outcome.report.skipped.push(ChunkSkip {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        outcome.report.decoded += 1;

        let edges = locate_edges(&payload);
        tracing::debug!("chunk {index}: {} feed edge(s)", edges.len());
        outcome.report.edges += edges.len();

        for edge in edges {
            match edge_node(edge) {
                Ok(node) => outcome.posts.push(normalize_post(node)),
                Err(e) => {
                    tracing::warn!("error extracting node in chunk {index}: {e}");
                    outcome.report.node_errors += 1;
                }
            }
        }
    }

    outcome.report.posts = outcome.posts.len();
    outcome
}

static EMPTY_NODE: Value = Value::Null;

/// The node wrapped by an edge. An edge without a node yields an empty node,
/// which normalizes to an all-default post.
fn edge_node(edge: &Value) -> FeedResult<&Value> {
    let Value::Object(map) = edge else {
        return Err(FeedError::MalformedEdge(format!(
            "expected object, got {}",
            kind_name(edge)
        )));
    };
    Ok(map.get("node").unwrap_or(&EMPTY_NODE))
}

/// Parse the raw log at `raw_path` into posts.
pub fn parse_raw_log(raw_path: &Path) -> FeedResult<ParseOutcome> {
    let chunks = load_raw_log(raw_path)?;
    Ok(parse_chunks(chunks))
}

/// Parse the raw log and overwrite `out_path` with the result.
pub fn run_parse_stage(raw_path: &Path, out_path: &Path) -> FeedResult<ParseReport> {
    let outcome = parse_raw_log(raw_path)?;
    write_posts(out_path, &outcome.posts)?;

    let report = outcome.report;
    tracing::info!(
        "saved {} parsed posts to {} ({} chunks, {} skipped, {} node errors)",
        report.posts,
        out_path.display(),
        report.chunks,
        report.skipped.len(),
        report.node_errors
    );
    Ok(report)
}
