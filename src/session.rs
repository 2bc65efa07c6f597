// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-view state: one trace, its call tree and the navigation over it.
//!
//! A session is created when a trace view opens and dropped when it closes. Switching to a
//! different trace means building a new session; nothing carries over.

use crossterm::event::KeyCode;
use tracing::{debug, warn};

use crate::model::{CallId, CallRecord, TraceId};
use crate::nav::{FocusWindow, KeyDispatch, KeyMap, Navigator};
use crate::ops::{ApplyResult, PatchMode};
use crate::store::CallTree;
use crate::tail::{PatchBatch, SinkClosed, TailEvent, TailSink, TailStatus};

#[derive(Debug, Clone)]
pub struct TraceSession {
    trace_id: TraceId,
    tree: CallTree,
    nav: Navigator,
    mode: PatchMode,
    status: TailStatus,
}

impl TraceSession {
    pub fn new(trace_id: TraceId, mode: PatchMode) -> Self {
        let tree = CallTree::new(trace_id.root_call_id());
        Self { trace_id, tree, nav: Navigator::new(), mode, status: TailStatus::default() }
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn nav(&self) -> &Navigator {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut Navigator {
        &mut self.nav
    }

    pub fn mode(&self) -> PatchMode {
        self.mode
    }

    pub fn status(&self) -> &TailStatus {
        &self.status
    }

    pub fn selected_record(&self) -> Option<(&CallId, &CallRecord)> {
        let id = self.nav.selected()?;
        self.tree.get(id).map(|record| (id, record))
    }

    pub fn focus(&self) -> FocusWindow {
        self.nav.focus(&self.tree)
    }

    /// Applies one poll tick's lines as a single tree update, then gives auto-selection a
    /// chance to fire.
    pub fn apply_batch(&mut self, batch: PatchBatch) -> ApplyResult {
        let lines = batch.records.len();
        let result = self.tree.apply_records(batch.records, self.mode);
        if !result.rejected.is_empty() {
            warn!(
                trace = %self.trace_id,
                rejected = result.rejected.len(),
                "dropped writes to records that were never introduced"
            );
        }
        self.nav.auto_select(&self.tree);
        debug!(
            start = batch.start,
            end = batch.end,
            lines,
            added = result.delta.added.len(),
            updated = result.delta.updated.len(),
            rev = result.new_rev,
            "batch applied"
        );
        result
    }

    pub fn handle_event(&mut self, event: TailEvent) {
        match event {
            TailEvent::Batch(batch) => {
                self.apply_batch(batch);
            }
            TailEvent::Status(status) => self.status = status,
        }
    }

    pub fn dispatch_key(&mut self, keys: &KeyMap, code: KeyCode) -> KeyDispatch {
        keys.dispatch(&mut self.nav, &self.tree, code)
    }
}

impl TailSink for TraceSession {
    fn apply_batch(&mut self, batch: PatchBatch) -> Result<(), SinkClosed> {
        TraceSession::apply_batch(self, batch);
        Ok(())
    }

    fn report(&mut self, status: &TailStatus) {
        self.status = status.clone();
    }
}
