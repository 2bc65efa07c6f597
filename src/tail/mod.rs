// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Trace tail poller.
//!
//! A [`TailPoller`] owns the byte offset into one trace log. Each tick probes the log length,
//! fetches at most one window past the offset, consumes the newline-terminated prefix of the
//! window and hands the decoded lines to a [`TailSink`] as one [`PatchBatch`]. The offset only
//! moves after the sink accepted the batch, so a failed tick is retried from the same place.
//!
//! Ticks are strictly sequential. The poller checks its [`CancellationToken`] after every
//! await and drops whatever it fetched once cancelled; [`TailPoller::run`] also abandons a
//! tick that is still waiting on its source.

use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub mod lines;
pub mod source;

pub use lines::LineError;
pub use source::{FileLogSource, HttpLogSource, LogSource, MemoryLogSource, TransportError};

pub const DEFAULT_SLOW_INTERVAL: Duration = Duration::from_millis(1_000);
pub const DEFAULT_FAST_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_MAX_CHUNK_BYTES: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailConfig {
    /// Delay after a tick that found nothing new, or failed before the window was known.
    pub slow_interval: Duration,
    /// Delay after a tick whose window stopped short of the log end, even if it then failed.
    pub fast_interval: Duration,
    pub max_chunk_bytes: u64,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            slow_interval: DEFAULT_SLOW_INTERVAL,
            fast_interval: DEFAULT_FAST_INTERVAL,
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
        }
    }
}

/// Decoded lines of one tick, covering log bytes `start..end`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchBatch {
    pub start: u64,
    pub end: u64,
    pub records: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TailStatus {
    pub offset: u64,
    pub remote_len: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl TailStatus {
    pub fn is_stalled(&self) -> bool {
        self.consecutive_failures > 0
    }

    pub fn is_caught_up(&self) -> bool {
        self.offset >= self.remote_len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The offset already covers the whole log.
    CaughtUp,
    /// A window was fetched; `consumed` bytes were applied and `more` is set when the log
    /// extends past the window.
    Advanced { lines: usize, consumed: u64, more: bool },
    /// The poller was cancelled while the tick was suspended; its result was dropped.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Line(#[from] LineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tail sink closed")]
pub struct SinkClosed;

/// Receiver of the poller's output.
pub trait TailSink {
    fn apply_batch(&mut self, batch: PatchBatch) -> Result<(), SinkClosed>;

    fn report(&mut self, _status: &TailStatus) {}
}

/// What a poller task sends to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum TailEvent {
    Batch(PatchBatch),
    Status(TailStatus),
}

impl TailSink for UnboundedSender<TailEvent> {
    fn apply_batch(&mut self, batch: PatchBatch) -> Result<(), SinkClosed> {
        self.send(TailEvent::Batch(batch)).map_err(|_| SinkClosed)
    }

    fn report(&mut self, status: &TailStatus) {
        if self.send(TailEvent::Status(status.clone())).is_err() {
            debug!("tail status dropped, receiver closed");
        }
    }
}

#[derive(Debug)]
pub struct TailPoller<S> {
    source: S,
    config: TailConfig,
    offset: u64,
    status: TailStatus,
    cancel: CancellationToken,
    /// Set once the current tick's window is known to stop short of the log end.
    window_short: bool,
}

impl<S: LogSource> TailPoller<S> {
    pub fn new(source: S, config: TailConfig) -> Self {
        Self::with_cancel(source, config, CancellationToken::new())
    }

    pub fn with_cancel(source: S, config: TailConfig, cancel: CancellationToken) -> Self {
        Self {
            source,
            config,
            offset: 0,
            status: TailStatus::default(),
            cancel,
            window_short: false,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn status(&self) -> &TailStatus {
        &self.status
    }

    pub fn config(&self) -> &TailConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// One poll cycle. Does not touch [`Self::status`]; see [`Self::step`].
    pub async fn tick<K: TailSink + ?Sized>(
        &mut self,
        sink: &mut K,
    ) -> Result<TickOutcome, TickError> {
        if !self.is_live() {
            return Ok(TickOutcome::Cancelled);
        }
        self.window_short = false;

        let remote_len = self.source.content_length().await?;
        if !self.is_live() {
            return Ok(TickOutcome::Cancelled);
        }
        self.status.remote_len = remote_len;
        if self.offset >= remote_len {
            return Ok(TickOutcome::CaughtUp);
        }

        let limit = remote_len.min(self.offset.saturating_add(self.config.max_chunk_bytes));
        let more = limit < remote_len;
        self.window_short = more;

        let mut chunk = self.source.fetch_range(self.offset, limit).await?;
        if !self.is_live() {
            return Ok(TickOutcome::Cancelled);
        }
        chunk.truncate((limit - self.offset) as usize);

        let consumed = lines::complete_prefix(&chunk);
        if consumed == 0 && more && chunk.len() as u64 == self.config.max_chunk_bytes {
            warn!(
                offset = self.offset,
                max_chunk_bytes = self.config.max_chunk_bytes,
                "log line longer than one fetch window; tail cannot advance"
            );
        }

        let records = lines::decode_lines(&chunk[..consumed], self.offset)?;
        let lines = records.len();
        let start = self.offset;
        let end = start + consumed as u64;
        if !records.is_empty() && sink.apply_batch(PatchBatch { start, end, records }).is_err() {
            self.cancel.cancel();
            return Ok(TickOutcome::Cancelled);
        }

        self.offset = end;
        debug!(start, end, lines, remote_len, more, "tail tick applied");
        Ok(TickOutcome::Advanced { lines, consumed: consumed as u64, more })
    }

    /// Runs one tick, folds its result into [`Self::status`] and reports the status to the sink.
    /// Returns the delay before the next tick, or `None` once cancelled.
    pub async fn step<K: TailSink + ?Sized>(&mut self, sink: &mut K) -> Option<Duration> {
        let delay = match self.tick(sink).await {
            Ok(TickOutcome::Cancelled) => return None,
            Ok(outcome) => {
                self.status.consecutive_failures = 0;
                self.status.last_error = None;
                match outcome {
                    TickOutcome::Advanced { more: true, .. } => self.config.fast_interval,
                    _ => self.config.slow_interval,
                }
            }
            Err(err) => {
                if !self.is_live() {
                    return None;
                }
                warn!(offset = self.offset, error = %err, "trace fetch failed");
                self.status.consecutive_failures =
                    self.status.consecutive_failures.saturating_add(1);
                self.status.last_error = Some(err.to_string());
                if self.window_short {
                    self.config.fast_interval
                } else {
                    self.config.slow_interval
                }
            }
        };
        self.status.offset = self.offset;
        sink.report(&self.status);
        Some(delay)
    }

    /// Polls until cancelled. The next tick is only scheduled after the current one resolved.
    /// Cancelling drops an in-flight tick.
    pub async fn run<K: TailSink + ?Sized>(mut self, sink: &mut K) {
        let cancel = self.cancel.clone();
        loop {
            let delay = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                delay = self.step(sink) => delay,
            };
            let Some(delay) = delay else { break };
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        debug!(offset = self.offset, "tail poller stopped");
    }

    /// Ticks back to back until one finds the offset covering the whole log.
    /// Any failure ends the catch-up.
    pub async fn catch_up<K: TailSink + ?Sized>(&mut self, sink: &mut K) -> Result<(), TickError> {
        loop {
            match self.tick(sink).await? {
                TickOutcome::CaughtUp | TickOutcome::Cancelled => break,
                // Only a partial line left, or a line wider than the window.
                TickOutcome::Advanced { consumed: 0, .. } => break,
                TickOutcome::Advanced { .. } => {}
            }
        }
        self.status.offset = self.offset;
        sink.report(&self.status);
        Ok(())
    }
}
