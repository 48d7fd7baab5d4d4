// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Feedtap — capture filtering, raw response log, and schema-tolerant
//! normalization of social timeline payloads.

pub mod decode;
pub mod filter;
pub mod locate;
pub mod normalize;
pub mod path;
pub mod pipeline;
pub mod store;
pub mod types;

pub use decode::decode_resilient;
pub use filter::ResponseFilter;
pub use locate::locate_edges;
pub use normalize::normalize_post;
pub use pipeline::{parse_chunks, parse_raw_log, run_parse_stage, ChunkSkip, ParseOutcome, ParseReport};
pub use store::{load_raw_log, read_posts, write_posts, RawChunks, RawLogWriter};
pub use types::*;
