// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

/// Trim leading and trailing whitespace and control characters, the rule
/// git applies to the single-line pointer files (`.git` indirections and
/// `commondir`).
pub(crate) fn trim_metadata(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c.is_control())
}
