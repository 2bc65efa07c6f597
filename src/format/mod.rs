// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text shown for a call: display names, one-line payload summaries and source cleanup.

pub mod summary;

pub use summary::{
    display_name, is_model_call, pretty_json, short_summary, short_summary_with, strip_indent,
    MODEL_CALL_NAMES, SUMMARY_MAX_CHARS,
};
