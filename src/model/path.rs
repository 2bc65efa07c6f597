// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use smol_str::SmolStr;
use thiserror::Error;

/// One addressed location inside the trace, as written by the producer.
///
/// Accepts dotted keys (`a.b.c`), bracketed keys (`a["b.c"]`, `a['b']`) and bracketed
/// indices (`a[0]`). Segments are kept as raw keys; whether a key addresses an array slot is
/// decided where the value is written (see [`Segment::as_index`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchPath {
    segments: SmallVec<[Segment; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment(SmolStr);

impl Segment {
    pub fn new(key: &str) -> Self {
        Self(SmolStr::new(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical non-negative integers (`0`, `17`, not `01`) address array slots.
    pub fn as_index(&self) -> Option<usize> {
        let raw = self.0.as_str();
        if raw.is_empty() || (raw.len() > 1 && raw.starts_with('0')) {
            return None;
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("patch path is empty")]
    Empty,
    #[error("empty segment at byte {at} of patch path")]
    EmptySegment { at: usize },
    #[error("unterminated bracket starting at byte {at} of patch path")]
    UnterminatedBracket { at: usize },
    #[error("unexpected '{found}' at byte {at} of patch path")]
    Unexpected { found: char, at: usize },
}

impl PatchPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let bytes = raw.as_bytes();
        let mut segments = SmallVec::new();
        let mut pos = 0usize;

        loop {
            if bytes.get(pos) == Some(&b'[') {
                let (segment, next) = parse_bracket(raw, pos)?;
                segments.push(segment);
                pos = next;
            } else {
                let end = raw[pos..].find(['.', '[']).map_or(raw.len(), |offset| pos + offset);
                if end == pos {
                    return Err(PathError::EmptySegment { at: pos });
                }
                if let Some(bad) = raw[pos..end].find(']') {
                    return Err(PathError::Unexpected { found: ']', at: pos + bad });
                }
                segments.push(Segment::new(&raw[pos..end]));
                pos = end;
            }

            match bytes.get(pos) {
                None => break,
                Some(b'.') => {
                    pos += 1;
                    if pos == raw.len() {
                        return Err(PathError::EmptySegment { at: pos });
                    }
                }
                Some(b'[') => {}
                Some(_) => {
                    let found = raw[pos..].chars().next().unwrap_or('?');
                    return Err(PathError::Unexpected { found, at: pos });
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { segments: segments.into_iter().map(|s| Segment::new(s.as_ref())).collect() }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for PatchPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            let key = segment.as_str();
            if key.contains(['.', '[', ']']) {
                write!(f, "[{key:?}]")?;
            } else if index == 0 {
                f.write_str(key)?;
            } else {
                write!(f, ".{key}")?;
            }
        }
        Ok(())
    }
}

fn parse_bracket(raw: &str, open: usize) -> Result<(Segment, usize), PathError> {
    let bytes = raw.as_bytes();
    let start = open + 1;

    match bytes.get(start) {
        Some(&quote @ (b'"' | b'\'')) => {
            let mut key = String::new();
            let mut escaped = false;
            for (offset, ch) in raw[start + 1..].char_indices() {
                let at = start + 1 + offset;
                if escaped {
                    key.push(ch);
                    escaped = false;
                    continue;
                }
                match ch {
                    '\\' => escaped = true,
                    ch if ch as u32 == u32::from(quote) => {
                        if bytes.get(at + 1) != Some(&b']') {
                            return Err(PathError::UnterminatedBracket { at: open });
                        }
                        return Ok((Segment::new(&key), at + 2));
                    }
                    ch => key.push(ch),
                }
            }
            Err(PathError::UnterminatedBracket { at: open })
        }
        _ => {
            let close = raw[start..]
                .find(']')
                .map(|offset| start + offset)
                .ok_or(PathError::UnterminatedBracket { at: open })?;
            if close == start {
                return Err(PathError::EmptySegment { at: start });
            }
            Ok((Segment::new(raw[start..close].trim()), close + 1))
        }
    }
}
