// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A trace is a tree of call records keyed by producer-assigned ids, addressed on the wire by
//! dotted patch paths.

pub mod call;
pub mod ids;
pub mod path;

pub use call::{CallRecord, ChildList};
pub use ids::{CallId, Id, IdError, RecordId, TraceId, TraceIdError};
pub use path::{PatchPath, PathError, Segment};
