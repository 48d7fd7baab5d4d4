// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-backed response source using chromiumoxide.
//!
//! The session records the URL of every `Network.responseReceived` event and
//! yields the exchange once `Network.loadingFinished` arrives for the same
//! request, which is when `Network.getResponseBody` can return the full body.

use super::cookies::{cookie_domain, parse_cookie_header};
use super::{ObservedExchange, ResponseSource};
use crate::config::{CaptureConfig, CHROMIUM_PATH_ENV};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, EventLoadingFailed, EventLoadingFinished, EventResponseReceived,
    GetResponseBodyParams, RequestId,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::page::Page;
use feedtap::ResponseFilter;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Upper bound on the initial navigation before capture starts regardless.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. FEEDTAP_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.feedtap/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".feedtap/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".feedtap/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".feedtap/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".feedtap/chromium/chrome-linux64/chrome"),
                home.join(".feedtap/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// A single Chromium page opened on the capture target.
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    responses: EventStream<EventResponseReceived>,
    finished: EventStream<EventLoadingFinished>,
    failed: EventStream<EventLoadingFailed>,
    filter: ResponseFilter,
    /// Candidate response URLs awaiting their loading-finished event.
    pending: HashMap<RequestId, String>,
}

impl ChromiumSession {
    /// Launch Chromium, inject session cookies, subscribe to network events,
    /// and navigate to the target page.
    ///
    /// Only responses whose URL passes `filter` are tracked and yielded.
    pub async fn open(config: &CaptureConfig, filter: &ResponseFilter) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if config.headed {
            builder = builder.with_head();
        } else {
            builder = builder.arg("--headless=new");
        }
        match find_chromium() {
            Some(path) => builder = builder.chrome_executable(path),
            None => tracing::debug!("no Chromium found in known locations, using default detection"),
        }
        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        if let Some(header) = &config.cookie {
            let cookies = build_cookies(header, &config.target_url)?;
            let count = cookies.len();
            page.set_cookies(cookies)
                .await
                .context("failed to inject session cookies")?;
            tracing::info!("injected {count} session cookie(s)");
        }

        let responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .context("failed to subscribe to responses")?;
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .context("failed to subscribe to loading events")?;
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .context("failed to subscribe to loading failures")?;

        let mut session = Self {
            browser,
            handler,
            page,
            responses,
            finished,
            failed,
            filter: filter.clone(),
            pending: HashMap::new(),
        };
        session.navigate(&config.target_url).await?;
        Ok(session)
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        tracing::info!("opening target page {url}");
        let start = Instant::now();

        match tokio::time::timeout(NAVIGATION_TIMEOUT, self.page.goto(url)).await {
            Ok(Ok(_)) => {
                tracing::info!("page loaded in {}ms", start.elapsed().as_millis());
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => {
                // Feed pages keep streaming long after load; capture anyway.
                tracing::warn!(
                    "navigation did not settle within {}s, capturing anyway",
                    NAVIGATION_TIMEOUT.as_secs()
                );
                Ok(())
            }
        }
    }

    /// Close the page and the browser.
    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.page.close().await {
            tracing::debug!("page close failed: {e}");
        }
        if let Err(e) = self.browser.close().await {
            tracing::warn!("browser did not close cleanly: {e}");
        }
        match self.browser.wait().await {
            Ok(status) => tracing::debug!("browser exited: {status:?}"),
            Err(e) => tracing::debug!("waiting for browser exit failed: {e}"),
        }
        self.handler.abort();
        Ok(())
    }
}

fn build_cookies(header: &str, target_url: &str) -> Result<Vec<CookieParam>> {
    let domain = cookie_domain(target_url)?;
    parse_cookie_header(header)
        .into_iter()
        .map(|(name, value)| {
            CookieParam::builder()
                .name(name)
                .value(value)
                .url(target_url)
                .domain(domain.clone())
                .path("/")
                .build()
                .map_err(|e| anyhow::anyhow!("invalid cookie: {e}"))
        })
        .collect()
}

/// Remember a response until it finishes loading, if its URL is a candidate.
fn track_response(
    pending: &mut HashMap<RequestId, String>,
    filter: &ResponseFilter,
    request_id: &RequestId,
    url: &str,
) -> bool {
    if !filter.matches_url(url) {
        return false;
    }
    pending.insert(request_id.clone(), url.to_string());
    true
}

#[async_trait]
impl ResponseSource for ChromiumSession {
    async fn next_exchange(&mut self) -> Option<ObservedExchange> {
        loop {
            tokio::select! {
                biased;
                Some(event) = self.responses.next() => {
                    track_response(
                        &mut self.pending,
                        &self.filter,
                        &event.request_id,
                        &event.response.url,
                    );
                }
                Some(event) = self.failed.next() => {
                    self.pending.remove(&event.request_id);
                }
                Some(event) = self.finished.next() => {
                    if let Some(url) = self.pending.remove(&event.request_id) {
                        return Some(ObservedExchange {
                            request_id: event.request_id.inner().clone(),
                            url,
                        });
                    }
                }
                else => return None,
            }
        }
    }

    async fn read_body(&mut self, exchange: &ObservedExchange) -> Result<String> {
        let params = GetResponseBodyParams::new(RequestId::new(exchange.request_id.clone()));
        let response = self
            .page
            .execute(params)
            .await
            .context("failed to read response body")?;

        let body = response.result;
        if !body.base64_encoded {
            return Ok(body.body);
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.body.as_bytes())
            .context("response body is not valid base64")?;
        String::from_utf8(bytes).context("response body is not UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cookies_scopes_to_target_domain() {
        let cookies = build_cookies("c_user=42; xs=abc", "https://www.facebook.com/nasa/").unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "c_user");
        assert_eq!(cookies[0].value, "42");
        assert_eq!(cookies[0].domain.as_deref(), Some(".facebook.com"));
        assert_eq!(cookies[1].path.as_deref(), Some("/"));
    }

    #[test]
    fn test_only_candidate_responses_are_tracked() {
        let filter = ResponseFilter::default();
        let mut pending = HashMap::new();

        assert!(!track_response(
            &mut pending,
            &filter,
            &RequestId::new("1"),
            "https://static.xx.fbcdn.net/rsrc.php/app.js",
        ));
        assert!(track_response(
            &mut pending,
            &filter,
            &RequestId::new("2"),
            "https://www.facebook.com/api/graphql/",
        ));

        assert_eq!(pending.len(), 1);
        assert!(pending.contains_key(&RequestId::new("2")));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_observes_page_responses() {
        let config = CaptureConfig {
            target_url: "data:text/html,<h1>Hello</h1>".to_string(),
            ..CaptureConfig::default()
        };
        let session = ChromiumSession::open(&config, &ResponseFilter::default())
            .await
            .expect("failed to open session");
        session.close().await.expect("close failed");
    }
}
