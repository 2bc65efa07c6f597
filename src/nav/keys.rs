// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use crossterm::event::KeyCode;

use super::Navigator;
use crate::store::CallTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavAction {
    Up,
    Down,
    Left,
    Right,
}

impl NavAction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Down, Self::Up, Self::Right];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDispatch {
    /// A binding matched; the key is consumed even if the move had no target.
    Handled { action: NavAction, changed: bool },
    /// No binding, or nothing selected. The caller may handle the key itself.
    Ignored,
}

impl KeyDispatch {
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// Arrow keys plus the `h j k l` alias group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: HashMap<KeyCode, NavAction>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::standard()
    }
}

impl KeyMap {
    pub fn standard() -> Self {
        let arrows = [KeyCode::Left, KeyCode::Down, KeyCode::Up, KeyCode::Right];
        let letters = ['h', 'j', 'k', 'l'].map(KeyCode::Char);
        let bindings = NavAction::ALL
            .into_iter()
            .zip(arrows)
            .chain(NavAction::ALL.into_iter().zip(letters))
            .map(|(action, code)| (code, action))
            .collect();
        Self { bindings }
    }

    pub fn lookup(&self, code: KeyCode) -> Option<NavAction> {
        self.bindings.get(&code).copied()
    }

    /// Bindings are only live while something is selected.
    pub fn dispatch(&self, nav: &mut Navigator, tree: &CallTree, code: KeyCode) -> KeyDispatch {
        if nav.selected().is_none() {
            return KeyDispatch::Ignored;
        }
        match self.lookup(code) {
            Some(action) => KeyDispatch::Handled { action, changed: nav.apply(tree, action) },
            None => KeyDispatch::Ignored,
        }
    }
}
