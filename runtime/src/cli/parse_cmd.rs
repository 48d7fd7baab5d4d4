// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! `feedtap parse` — normalize an existing raw log into the posts file.

use crate::config::DataPaths;
use anyhow::{Context, Result};
use feedtap::{run_parse_stage, ParseReport};

/// Run the parse stage over `paths.raw_log`, overwriting `paths.parsed_out`.
pub async fn run(paths: &DataPaths) -> Result<ParseReport> {
    let report = run_parse_stage(&paths.raw_log, &paths.parsed_out).with_context(|| {
        format!(
            "failed to write parsed posts to {}",
            paths.parsed_out.display()
        )
    })?;

    if !report.skipped.is_empty() {
        println!("  Skipped {} unreadable chunk(s)", report.skipped.len());
    }
    println!(
        "Saved {} parsed posts to {}",
        report.posts,
        paths.parsed_out.display()
    );
    Ok(report)
}
