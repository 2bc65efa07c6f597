// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use smol_str::SmolStr;
use thiserror::Error;

/// A producer-assigned identifier.
///
/// Ids are opaque, but they appear as the leading segment of dotted patch paths such as
/// `<id>.children.<child>`, so they must be non-empty and free of path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: SmolStr,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
        let value = value.as_ref();
        validate_id_segment(value)?;
        Ok(Self { value: SmolStr::new(value), _marker: PhantomData })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value.to_string()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain '{0}'")]
    ContainsSeparator(char),
}

fn validate_id_segment(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if let Some(ch) = value.chars().find(|ch| matches!(ch, '.' | '[' | ']')) {
        return Err(IdError::ContainsSeparator(ch));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallIdTag {}
pub type CallId = Id<CallIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordIdTag {}
pub type RecordId = Id<RecordIdTag>;

const ULID_PATTERN: &str = "^[0123456789ABCDEFGHJKMNPQRSTVWXYZ]{26}$";

fn ulid_regex() -> &'static Regex {
    static ULID: OnceLock<Regex> = OnceLock::new();
    ULID.get_or_init(|| Regex::new(ULID_PATTERN).expect("valid ULID pattern"))
}

/// Identifier of one trace log: a 26-character Crockford base32 ULID.
///
/// The trace id doubles as the sentinel root of the call tree: top-level calls name it as
/// their `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId(SmolStr);

impl TraceId {
    pub fn parse(value: &str) -> Result<Self, TraceIdError> {
        if !ulid_regex().is_match(value) {
            return Err(TraceIdError::NotUlid(value.to_owned()));
        }
        Ok(Self(SmolStr::new(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The root sentinel id used inside the call tree.
    pub fn root_call_id(&self) -> CallId {
        CallId { value: self.0.clone(), _marker: PhantomData }
    }

    /// Log resource path relative to a trace server base URL.
    pub fn log_path(&self) -> String {
        format!("/traces/{}.jsonl", self.0)
    }

    pub fn log_file_name(&self) -> String {
        format!("{}.jsonl", self.0)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TraceId {
    type Err = TraceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceIdError {
    #[error("no trace selected: '{0}' is not a ULID")]
    NotUlid(String),
}
