// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selection, expand/collapse state and keyboard traversal over a [`CallTree`].
//!
//! The navigator only reads the tree. Traversal is defined over the visible tree: a node's
//! children take part only while the node is expanded.

use std::collections::HashSet;

use tracing::debug;

use crate::model::CallId;
use crate::store::CallTree;

pub mod keys;

pub use keys::{KeyDispatch, KeyMap, NavAction};

/// Nodes shown at full intensity for the current selection.
///
/// The window is rooted two levels above the selection (falling back to the parent, then to
/// the selection itself) and covers that root, its children and its grandchildren.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusWindow {
    root: Option<CallId>,
    members: HashSet<CallId>,
}

impl FocusWindow {
    /// Every node is focused while nothing is selected.
    pub fn everything() -> Self {
        Self { root: None, members: HashSet::new() }
    }

    /// Grandparent of the selection, or its parent when that is the top. May be the trace
    /// root itself, which is never drawn as a row.
    pub fn root(&self) -> Option<&CallId> {
        self.root.as_ref()
    }

    pub fn contains(&self, id: &CallId) -> bool {
        self.root.is_none() || self.members.contains(id)
    }

    pub fn len(&self) -> Option<usize> {
        self.root.as_ref().map(|_| self.members.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    selected: Option<CallId>,
    expanded: HashSet<CallId>,
    autoselect_done: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&CallId> {
        self.selected.as_ref()
    }

    /// Explicit selection. Also retires auto-selection for this view.
    pub fn select(&mut self, id: CallId) {
        self.autoselect_done = true;
        self.selected = Some(id);
    }

    pub fn is_expanded(&self, id: &CallId) -> bool {
        self.expanded.contains(id)
    }

    pub fn set_expanded(&mut self, id: &CallId, expanded: bool) {
        if expanded {
            self.expanded.insert(id.clone());
        } else {
            self.expanded.remove(id);
        }
    }

    pub fn autoselect_done(&self) -> bool {
        self.autoselect_done
    }

    /// Selects the first child of the first top-level call once both exist. Fires at most once.
    pub fn auto_select(&mut self, tree: &CallTree) -> bool {
        if self.autoselect_done {
            return false;
        }
        let Some(first_root) = tree.first_top_level() else {
            return false;
        };
        let Some(first_child) = tree.children_of(first_root).first() else {
            return false;
        };
        debug!(id = %first_child, "auto-selecting first call");
        self.select(first_child.clone());
        true
    }

    pub fn focus(&self, tree: &CallTree) -> FocusWindow {
        let Some(selected) = self.selected.as_ref() else {
            return FocusWindow::everything();
        };
        let Some(record) = tree.get(selected) else {
            return FocusWindow::everything();
        };

        let parent = record.parent();
        let root = parent
            .and_then(|parent| tree.parent_of(parent))
            .or(parent)
            .unwrap_or(selected)
            .clone();

        let mut members = HashSet::from([root.clone()]);
        for child in tree.children_of(&root) {
            members.insert(child.clone());
            members.extend(tree.children_of(child).iter().cloned());
        }
        FocusWindow { root: Some(root), members }
    }

    /// Parent for navigation purposes: the trace root is never a navigation target.
    pub fn parent_of(&self, tree: &CallTree, id: &CallId) -> Option<CallId> {
        tree.parent_of(id).filter(|parent| *parent != tree.root()).cloned()
    }

    pub fn expanded_children<'t>(&self, tree: &'t CallTree, id: &CallId) -> &'t [CallId] {
        if self.is_expanded(id) {
            tree.children_of(id)
        } else {
            &[]
        }
    }

    fn sibling_at(tree: &CallTree, id: &CallId, step: isize) -> Option<CallId> {
        let parent = tree.parent_of(id)?;
        let siblings = tree.children_of(parent);
        let index = siblings.iter().position(|sibling| sibling == id)?;
        let target = index.checked_add_signed(step)?;
        siblings.get(target).cloned()
    }

    pub fn prior_sibling(&self, tree: &CallTree, id: &CallId) -> Option<CallId> {
        Self::sibling_at(tree, id, -1)
    }

    pub fn next_sibling(&self, tree: &CallTree, id: &CallId) -> Option<CallId> {
        Self::sibling_at(tree, id, 1)
    }

    /// Applies `action` to the current selection. Returns whether any state changed.
    pub fn apply(&mut self, tree: &CallTree, action: NavAction) -> bool {
        let Some(selected) = self.selected.clone() else {
            return false;
        };
        match action {
            NavAction::Up => self.move_to(self.before(tree, &selected)),
            NavAction::Down => self.move_to(self.after(tree, &selected)),
            NavAction::Left => {
                if self.expanded_children(tree, &selected).is_empty() {
                    self.move_to(self.parent_of(tree, &selected))
                } else {
                    self.set_expanded(&selected, false);
                    true
                }
            }
            NavAction::Right => {
                if tree.children_of(&selected).is_empty() || self.is_expanded(&selected) {
                    return false;
                }
                self.set_expanded(&selected, true);
                true
            }
        }
    }

    /// Keeps the current selection when the move has no target.
    fn move_to(&mut self, target: Option<CallId>) -> bool {
        match target {
            Some(target) if self.selected.as_ref() != Some(&target) => {
                self.selected = Some(target);
                true
            }
            _ => false,
        }
    }

    /// Previous node in visible pre-order: the prior sibling's last visible descendant, or the
    /// parent when there is no prior sibling.
    fn before(&self, tree: &CallTree, id: &CallId) -> Option<CallId> {
        let Some(mut current) = self.prior_sibling(tree, id) else {
            return self.parent_of(tree, id);
        };
        let mut seen = HashSet::new();
        while let Some(last) = self.expanded_children(tree, &current).last() {
            if !seen.insert(current.clone()) {
                break;
            }
            current = last.clone();
        }
        Some(current)
    }

    /// Next node in visible pre-order: the first expanded child, else the nearest next
    /// sibling of the node or one of its ancestors.
    fn after(&self, tree: &CallTree, id: &CallId) -> Option<CallId> {
        if let Some(first) = self.expanded_children(tree, id).first() {
            return Some(first.clone());
        }
        let mut seen = HashSet::new();
        let mut current = id.clone();
        loop {
            if let Some(next) = self.next_sibling(tree, &current) {
                return Some(next);
            }
            if !seen.insert(current.clone()) {
                return None;
            }
            current = self.parent_of(tree, &current)?;
        }
    }
}

#[cfg(test)]
mod tests;
