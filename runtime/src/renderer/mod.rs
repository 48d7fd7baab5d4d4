// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Browser-side response source abstraction.
//!
//! Defines the `ResponseSource` trait the capture loop consumes. The Chromium
//! implementation lives in [`chromium`]; tests drive the loop with scripted
//! sources instead.

pub mod chromium;
pub mod cookies;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One network exchange whose response has finished loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedExchange {
    /// Browser-assigned request identifier, used to fetch the body.
    pub request_id: String,
    /// Final response URL.
    pub url: String,
}

/// A stream of finished network exchanges with on-demand body reads.
#[async_trait]
pub trait ResponseSource: Send {
    /// Wait for the next finished exchange. `None` once the source is closed.
    async fn next_exchange(&mut self) -> Option<ObservedExchange>;
    /// Read the response body of an exchange previously yielded.
    async fn read_body(&mut self, exchange: &ObservedExchange) -> Result<String>;
}
