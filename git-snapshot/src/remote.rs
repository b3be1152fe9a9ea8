// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Canonicalization of the many textual forms a remote URL can take.

use std::path::Path;

use url::Url;

/// Normalize `raw` into an absolute URI, resolving relative forms
/// against `workdir`.
///
/// Recognized, in order: a bare drive specifier (`X:`), scp-like
/// `[user@]host:path` (rewritten to `https://host/path`), an absolute
/// URI (returned unchanged), and a relative reference or local path. A
/// form none of these recognize yields `None`; the caller records the
/// diagnostic and carries on with its other remotes.
pub fn normalize(raw: &str, workdir: &Path) -> Option<Url> {
    let normalized = drive_root(raw)
        .or_else(|| scp_like(raw))
        .or_else(|| Url::parse(raw).ok())
        .or_else(|| relative(raw, workdir));

    if normalized.is_none() {
        tracing::warn!(url = raw, "remote URL failed normalization");
    }
    normalized
}

/// `X:` names the root of a drive.
fn drive_root(raw: &str) -> Option<Url> {
    let bytes = raw.as_bytes();
    (bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
        .then(|| Url::parse(&format!("file:///{}/", raw)).ok())
        .flatten()
}

/// `[user@]host:path`, the ssh shorthand: a colon not immediately
/// followed by `//`, with whatever precedes it shaped like a host
/// rather than a drive letter or a path.
fn scp_like(raw: &str) -> Option<Url> {
    let (left, path) = raw.split_once(':')?;
    if path.starts_with("//") {
        return None;
    }
    if left.len() == 1 && left.as_bytes()[0].is_ascii_alphabetic() {
        // drive specifier, not a host
        return None;
    }

    let host = match left.rsplit_once('@') {
        Some((user, host)) if !user.is_empty() => host,
        Some(_) => return None,
        None => left,
    };
    if host.is_empty() || host.contains('/') || host.contains('\\') {
        return None;
    }

    Url::parse(&format!("https://{}/{}", host, path.trim_start_matches('/'))).ok()
}

fn relative(raw: &str, workdir: &Path) -> Option<Url> {
    let base = Url::from_directory_path(workdir).ok()?;
    base.join(raw).ok()
}
