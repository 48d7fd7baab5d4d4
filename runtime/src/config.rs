// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed constants and path resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Profile page opened for capture.
pub const DEFAULT_TARGET_URL: &str = "https://www.facebook.com/nasa/";

/// How long the page is left open to collect responses.
pub const DEFAULT_DWELL_SECS: u64 = 30;

/// Data directory used when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Raw response log, relative to the data directory.
pub const RAW_LOG_FILE: &str = "graphql_logs.json";

/// Parsed output, relative to the data directory.
pub const PARSED_OUT_FILE: &str = "posts_parsed.json";

pub const DATA_DIR_ENV: &str = "FEEDTAP_DATA_DIR";
pub const COOKIE_ENV: &str = "FEEDTAP_COOKIE";
pub const CHROMIUM_PATH_ENV: &str = "FEEDTAP_CHROMIUM_PATH";

/// Resolve the data directory: explicit flag, then env, then `data`.
pub fn resolve_data_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }

    if let Ok(env_dir) = std::env::var(DATA_DIR_ENV) {
        if !env_dir.is_empty() {
            return PathBuf::from(env_dir);
        }
    }

    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Resolve the session cookie header: explicit flag, then env.
pub fn resolve_cookie(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(String::from)
        .or_else(|| std::env::var(COOKIE_ENV).ok())
        .filter(|c| !c.trim().is_empty())
}

/// Locations of the two stores inside a data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub raw_log: PathBuf,
    pub parsed_out: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            raw_log: data_dir.join(RAW_LOG_FILE),
            parsed_out: data_dir.join(PARSED_OUT_FILE),
        }
    }
}

/// Settings for one capture session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub target_url: String,
    pub dwell: Duration,
    /// `name=value; name2=value2` cookie header for the authenticated view.
    pub cookie: Option<String>,
    /// Show the browser window instead of running headless.
    pub headed: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            dwell: Duration::from_secs(DEFAULT_DWELL_SECS),
            cookie: None,
            headed: false,
        }
    }
}
