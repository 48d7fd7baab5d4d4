// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the feedtap binary.

pub mod parse_cmd;
pub mod run_cmd;
