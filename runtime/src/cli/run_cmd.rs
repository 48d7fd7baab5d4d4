// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! `feedtap run` — capture from a live page, then parse.

use crate::capture::{capture, CaptureReport};
use crate::cli::parse_cmd;
use crate::config::{CaptureConfig, DataPaths};
use crate::renderer::chromium::ChromiumSession;
use crate::renderer::ResponseSource;
use anyhow::{Context, Result};
use feedtap::{ParseReport, RawLogWriter, ResponseFilter};
use std::time::Duration;

/// Run the full pipeline against a Chromium session.
pub async fn run(paths: &DataPaths, config: &CaptureConfig) -> Result<()> {
    let mut session = ChromiumSession::open(config, &ResponseFilter::default())
        .await
        .with_context(|| format!("failed to open {}", config.target_url))?;

    let outcome = capture_then_parse(&mut session, paths, config.dwell).await;
    session.close().await?;
    outcome.map(|_| ())
}

/// Capture from any response source into the raw log, then re-parse the
/// whole log.
pub async fn capture_then_parse<S>(
    source: &mut S,
    paths: &DataPaths,
    dwell: Duration,
) -> Result<(CaptureReport, ParseReport)>
where
    S: ResponseSource + ?Sized,
{
    let mut log = RawLogWriter::open(&paths.raw_log)
        .with_context(|| format!("failed to open raw log {}", paths.raw_log.display()))?;

    let capture_report = capture(source, &ResponseFilter::default(), &mut log, dwell).await;
    println!(
        "Captured {} of {} GraphQL responses into {}",
        capture_report.accepted,
        capture_report.matched,
        paths.raw_log.display()
    );
    drop(log);

    let parse_report = parse_cmd::run(paths).await?;
    Ok((capture_report, parse_report))
}
