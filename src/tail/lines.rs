// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("malformed patch line {line} at byte {offset}: {source}")]
pub struct LineError {
    /// 1-based line number within the fetched chunk.
    pub line: usize,
    /// Absolute byte offset of the line in the log.
    pub offset: u64,
    #[source]
    pub source: serde_json::Error,
}

/// Length of the newline-terminated prefix of `chunk`; a trailing partial line is excluded.
pub fn complete_prefix(chunk: &[u8]) -> usize {
    memchr::memrchr(b'\n', chunk).map_or(0, |last| last + 1)
}

/// Decodes every non-blank line of `complete` (which must end at a line boundary).
///
/// `base` is the absolute offset of `complete[0]`, used for error reporting only. The first
/// malformed line fails the whole chunk.
pub fn decode_lines(complete: &[u8], base: u64) -> Result<Vec<Map<String, Value>>, LineError> {
    let mut records = Vec::new();
    let mut start = 0usize;
    for (index, end) in memchr::memchr_iter(b'\n', complete).enumerate() {
        let raw = &complete[start..end];
        let line_start = start;
        start = end + 1;
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let record = serde_json::from_slice(raw).map_err(|source| LineError {
            line: index + 1,
            offset: base + line_start as u64,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
