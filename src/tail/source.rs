// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Byte-range transports for trace logs.

use std::io;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, RANGE};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;
use tracing::debug;

use crate::model::TraceId;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected status: {status}")]
    UnexpectedStatus { status: u16 },
    #[error("invalid byte range {start}..{end}")]
    InvalidRange { start: u64, end: u64 },
}

/// An append-only log that can report its length and serve byte ranges.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Current total length of the log in bytes.
    async fn content_length(&self) -> Result<u64, TransportError>;

    /// Bytes `start..end` of the log. May return fewer bytes than asked for if the log is
    /// shorter; never more.
    async fn fetch_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransportError>;
}

fn check_range(start: u64, end: u64) -> Result<(), TransportError> {
    if start > end {
        return Err(TransportError::InvalidRange { start, end });
    }
    Ok(())
}

/// Serves `<base>/traces/<id>.jsonl` from a trace server that answers HEAD and Range GETs.
#[derive(Debug, Clone)]
pub struct HttpLogSource {
    client: Client,
    url: String,
}

impl HttpLogSource {
    pub fn new(base_url: &str, trace_id: &TraceId) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        let url = format!("{}{}", base_url.trim_end_matches('/'), trace_id.log_path());
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LogSource for HttpLogSource {
    async fn content_length(&self) -> Result<u64, TransportError> {
        let response = self.client.head(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus { status: status.as_u16() });
        }
        // A missing or garbled header reads as an empty log.
        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0);
        Ok(length)
    }

    async fn fetch_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransportError> {
        check_range(start, end)?;
        if start == end {
            return Ok(Vec::new());
        }

        let mut first = itoa::Buffer::new();
        let mut last = itoa::Buffer::new();
        let range = format!("bytes={}-{}", first.format(start), last.format(end - 1));

        let response = self.client.get(&self.url).header(RANGE, range).send().await?;
        let status = response.status();
        if status != StatusCode::PARTIAL_CONTENT {
            return Err(TransportError::UnexpectedStatus { status: status.as_u16() });
        }
        let mut body = response.bytes().await?.to_vec();
        body.truncate((end - start) as usize);
        Ok(body)
    }
}

/// Reads `<dir>/<id>.jsonl` from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path, trace_id: &TraceId) -> Self {
        Self::new(dir.join(trace_id.log_file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSource for FileLogSource {
    async fn content_length(&self) -> Result<u64, TransportError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len()),
            // The producer may not have created the file yet.
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "trace log not created yet");
                Ok(0)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransportError> {
        check_range(start, end)?;
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(start)).await?;
        let mut body = Vec::with_capacity((end - start) as usize);
        file.take(end - start).read_to_end(&mut body).await?;
        Ok(body)
    }
}

/// A growable in-memory log shared between a writer and any number of readers.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSource {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: Arc::new(Mutex::new(bytes.into())) }
    }

    pub async fn append(&self, bytes: &[u8]) {
        self.bytes.lock().await.extend_from_slice(bytes);
    }

    pub async fn len(&self) -> usize {
        self.bytes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bytes.lock().await.is_empty()
    }
}

#[async_trait]
impl LogSource for MemoryLogSource {
    async fn content_length(&self) -> Result<u64, TransportError> {
        Ok(self.bytes.lock().await.len() as u64)
    }

    async fn fetch_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransportError> {
        check_range(start, end)?;
        let bytes = self.bytes.lock().await;
        let len = bytes.len() as u64;
        let (start, end) = (start.min(len) as usize, end.min(len) as usize);
        Ok(bytes[start..end].to_vec())
    }
}

#[async_trait]
impl<S: LogSource + ?Sized> LogSource for Arc<S> {
    async fn content_length(&self) -> Result<u64, TransportError> {
        (**self).content_length().await
    }

    async fn fetch_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransportError> {
        (**self).fetch_range(start, end).await
    }
}
