// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory call tree for one trace view.
//!
//! The tree only grows while a view is open and is dropped wholesale when the view closes.

pub mod call_tree;

pub use call_tree::CallTree;
