// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cookie header parsing for session bootstrap.

use anyhow::{Context, Result};
use url::{Host, Url};

/// Split a `name=value; name2=value2` header into pairs.
///
/// Values may themselves contain `=`. Pairs without a name or without `=`
/// are skipped with a warning.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Some((name.trim().to_string(), value.trim().to_string()))
            }
            _ => {
                tracing::warn!("ignoring malformed cookie pair: {pair}");
                None
            }
        })
        .collect()
}

/// Cookie domain covering the target host and its subdomains.
///
/// `https://www.facebook.com/nasa/` → `.facebook.com`. IP hosts are
/// returned as-is.
pub fn cookie_domain(target_url: &str) -> Result<String> {
    let url = Url::parse(target_url).with_context(|| format!("invalid target URL: {target_url}"))?;
    let host = url
        .host()
        .with_context(|| format!("target URL has no host: {target_url}"))?;

    Ok(match host {
        Host::Domain(domain) => {
            let bare = domain.strip_prefix("www.").unwrap_or(domain);
            format!(".{bare}")
        }
        Host::Ipv4(ip) => ip.to_string(),
        Host::Ipv6(ip) => ip.to_string(),
    })
}
