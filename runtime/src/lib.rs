// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Feedtap runtime library — browser capture and the CLI pipeline.
//!
//! This library crate exposes the core modules for integration testing.

pub mod capture;
pub mod cli;
pub mod config;
pub mod renderer;
