// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tracetail: a terminal viewer for live call-tree traces.
//!
//! A producer appends JSON patch lines to a per-trace log; tracetail tails that log over HTTP
//! byte ranges (or from disk), folds the patches into an in-memory [`store::CallTree`] and lets
//! the user walk the tree while it grows.

pub mod format;
pub mod model;
pub mod nav;
pub mod ops;
pub mod session;
pub mod store;
pub mod tail;
pub mod tui;
