// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Raw response log and parsed output file.
//!
//! The raw log is append-only: each accepted body is written followed by a
//! blank line. Capture and parsing only ever meet through this file, so a
//! log can be re-parsed as often as needed with newer extraction logic.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{FeedResult, NormalizedPost};

/// Separator written after every record.
pub const RECORD_DELIMITER: &str = "\n\n";

/// Append-only writer for raw response bodies.
pub struct RawLogWriter {
    file: File,
    path: PathBuf,
    records_written: u64,
}

impl RawLogWriter {
    /// Open or create the raw log, creating parent directories as needed.
    pub fn open(path: &Path) -> FeedResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            records_written: 0,
        })
    }

    /// Append one body followed by the record delimiter.
    pub fn append(&mut self, body: &str) -> FeedResult<()> {
        let body = collapse_blank_lines(body);
        self.file.write_all(body.as_bytes())?;
        self.file.write_all(RECORD_DELIMITER.as_bytes())?;
        self.file.flush()?;
        self.records_written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this writer (not the whole file).
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

/// Squash runs of newlines inside a body so it cannot contain the delimiter.
///
/// Raw newlines can only appear as whitespace between tokens in valid JSON,
/// so this never changes what the body decodes to.
fn collapse_blank_lines(body: &str) -> Cow<'_, str> {
    if !body.contains(RECORD_DELIMITER) {
        return Cow::Borrowed(body);
    }
    let mut out = String::with_capacity(body.len());
    let mut prev_newline = false;
    for ch in body.chars() {
        if ch == '\n' {
            if prev_newline {
                continue;
            }
            prev_newline = true;
        } else {
            prev_newline = false;
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

/// Read the whole raw log and return its records lazily.
///
/// A missing log is not an error: it yields no records.
pub fn load_raw_log(path: &Path) -> FeedResult<RawChunks> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(RawChunks::new(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("no raw log found at {}", path.display());
            Ok(RawChunks::new(String::new()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Iterator over trimmed, non-empty records of a raw log.
#[derive(Debug)]
pub struct RawChunks {
    text: String,
    pos: usize,
}

impl RawChunks {
    pub fn new(text: String) -> Self {
        Self { text, pos: 0 }
    }
}

impl Iterator for RawChunks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            let (chunk, advance) = match rest.find(RECORD_DELIMITER) {
                Some(i) => (&rest[..i], i + RECORD_DELIMITER.len()),
                None => (rest, rest.len()),
            };
            self.pos += advance;
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                return Some(chunk.to_string());
            }
        }
        None
    }
}

/// Overwrite the output file with a pretty-printed JSON array of posts.
pub fn write_posts(path: &Path, posts: &[NormalizedPost]) -> FeedResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(posts)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

/// Read back a previously written output file.
pub fn read_posts(path: &Path) -> FeedResult<Vec<NormalizedPost>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
