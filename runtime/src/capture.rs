// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Capture stage: filter live responses into the raw log for a fixed dwell.
//!
//! Exchanges are handled one at a time in arrival order. Only the dwell timer
//! ends a session early; a body that cannot be read or a failed append is
//! logged, counted, and skipped.

use crate::renderer::{ObservedExchange, ResponseSource};
use chrono::Utc;
use feedtap::{RawLogWriter, ResponseFilter};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for one capture session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptureReport {
    /// RFC 3339 start time.
    pub started_at: String,
    /// Finished exchanges seen.
    pub observed: u64,
    /// Exchanges whose URL carried the API marker.
    pub matched: u64,
    /// Bodies appended to the raw log.
    pub accepted: u64,
    /// Bodies dropped by the marker pre-filter.
    pub rejected: u64,
    pub read_errors: u64,
    pub write_errors: u64,
    /// Whether the dwell timer (rather than the source closing) ended capture.
    pub dwell_elapsed: bool,
}

/// Drain `source` into `log` until `dwell` elapses or the source closes.
pub async fn capture<S>(
    source: &mut S,
    filter: &ResponseFilter,
    log: &mut RawLogWriter,
    dwell: Duration,
) -> CaptureReport
where
    S: ResponseSource + ?Sized,
{
    let mut report = CaptureReport {
        started_at: Utc::now().to_rfc3339(),
        ..CaptureReport::default()
    };

    let drained = tokio::time::timeout(dwell, drain(source, filter, log, &mut report)).await;
    report.dwell_elapsed = drained.is_err();
    if report.dwell_elapsed {
        debug!("dwell of {}s elapsed", dwell.as_secs_f32());
    } else {
        info!("response source closed before dwell elapsed");
    }

    info!(
        "capture finished: {} observed, {} matched, {} saved to {}",
        report.observed,
        report.matched,
        report.accepted,
        log.path().display()
    );
    report
}

async fn drain<S>(
    source: &mut S,
    filter: &ResponseFilter,
    log: &mut RawLogWriter,
    report: &mut CaptureReport,
) where
    S: ResponseSource + ?Sized,
{
    while let Some(exchange) = source.next_exchange().await {
        report.observed += 1;
        if !filter.matches_url(&exchange.url) {
            continue;
        }
        report.matched += 1;
        handle_exchange(source, &exchange, filter, log, report).await;
    }
}

async fn handle_exchange<S>(
    source: &mut S,
    exchange: &ObservedExchange,
    filter: &ResponseFilter,
    log: &mut RawLogWriter,
    report: &mut CaptureReport,
) where
    S: ResponseSource + ?Sized,
{
    let body = match source.read_body(exchange).await {
        Ok(body) => body,
        Err(e) => {
            warn!("error reading response {}: {e:#}", exchange.url);
            report.read_errors += 1;
            return;
        }
    };

    let Some(body) = filter.accept(&exchange.url, &body) else {
        report.rejected += 1;
        return;
    };

    match log.append(body) {
        Ok(()) => {
            report.accepted += 1;
            info!("saved GraphQL response: {}", exchange.url);
        }
        Err(e) => {
            warn!("failed to append response {}: {e}", exchange.url);
            report.write_errors += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Replays a fixed list of exchanges; `None` bodies fail to read.
    struct Scripted {
        queue: VecDeque<(ObservedExchange, Option<String>)>,
        current: Option<Option<String>>,
        reads: Vec<String>,
    }

    impl Scripted {
        fn new(items: Vec<(&str, Option<&str>)>) -> Self {
            let queue = items
                .into_iter()
                .enumerate()
                .map(|(i, (url, body))| {
                    (
                        ObservedExchange {
                            request_id: i.to_string(),
                            url: url.to_string(),
                        },
                        body.map(String::from),
                    )
                })
                .collect();
            Self {
                queue,
                current: None,
                reads: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ResponseSource for Scripted {
        async fn next_exchange(&mut self) -> Option<ObservedExchange> {
            let (exchange, body) = self.queue.pop_front()?;
            self.current = Some(body);
            Some(exchange)
        }

        async fn read_body(&mut self, exchange: &ObservedExchange) -> Result<String> {
            self.reads.push(exchange.url.clone());
            self.current
                .take()
                .flatten()
                .ok_or_else(|| anyhow!("No data found for resource with given identifier"))
        }
    }

    const API: &str = "https://www.facebook.com/api/graphql/";

    #[tokio::test]
    async fn test_capture_filters_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphql_logs.json");
        let mut log = RawLogWriter::open(&path).unwrap();
        let mut source = Scripted::new(vec![
            ("https://static.xx.fbcdn.net/app.js", Some("story")),
            (API, Some(r#"for (;;);{"data":{"story":1}}"#)),
            (API, Some(r#"{"data":{"ads":true}}"#)),
            (API, None),
            (API, Some(r#"{"feedback":{}}"#)),
        ]);

        let report = capture(&mut source, &ResponseFilter::default(), &mut log, Duration::from_secs(5)).await;

        assert_eq!(report.observed, 5);
        assert_eq!(report.matched, 4);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.read_errors, 1);
        assert!(!report.dwell_elapsed);
        assert!(!source.reads.iter().any(|u| u.contains("fbcdn")));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\"data\":{\"story\":1}}\n\n{\"feedback\":{}}\n\n");
    }

    /// Never yields anything; only the dwell timer can end capture.
    struct Silent;

    #[async_trait]
    impl ResponseSource for Silent {
        async fn next_exchange(&mut self) -> Option<ObservedExchange> {
            futures::future::pending().await
        }

        async fn read_body(&mut self, _exchange: &ObservedExchange) -> Result<String> {
            unreachable!("no exchange is ever yielded")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dwell_timer_ends_capture() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RawLogWriter::open(&dir.path().join("log.json")).unwrap();

        let report = capture(&mut Silent, &ResponseFilter::default(), &mut log, Duration::from_secs(30)).await;

        assert!(report.dwell_elapsed);
        assert_eq!(report.observed, 0);
    }
}
