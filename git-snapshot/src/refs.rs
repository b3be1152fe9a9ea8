// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolution of reference values to commit identifiers.
//!
//! Only loose (single-file) references are consulted. No object database
//! access is made, so nothing can be said about the kind of object a
//! reference ultimately points to.

use std::{
    collections::BTreeSet,
    fs,
    io,
    path::Path,
};

use crate::{discover::Location, oid::Oid};

pub mod error {
    use std::{io, path::PathBuf};

    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum Resolve {
        #[error("failed to read {}", path.display())]
        Io {
            path: PathBuf,
            #[source]
            source: io::Error,
        },

        #[error("malformed reference: {0:?}")]
        Malformed(String),

        #[error("cyclic symbolic reference: {0:?}")]
        Cycle(String),
    }
}

/// Resolve a reference value against `common_dir`.
///
/// A value is either a 40-hex commit id, or a `ref: refs/…` indirection
/// naming a loose ref file under `common_dir`. Indirections are followed
/// iteratively with a seen-set; a missing ref file is an unborn branch
/// and resolves to `None` rather than an error.
pub fn resolve(value: &str, common_dir: &Path) -> Result<Option<Oid>, error::Resolve> {
    let mut seen = BTreeSet::new();
    let mut current = value.to_owned();

    loop {
        let trimmed = trim_end(&current);

        if let Some(oid) = as_object_id(trimmed) {
            return Ok(Some(oid));
        }

        let name = trimmed
            .strip_prefix("ref: ")
            .filter(|name| name.starts_with("refs/"))
            .ok_or_else(|| error::Resolve::Malformed(trimmed.to_owned()))?;

        if !seen.insert(name.to_owned()) {
            return Err(error::Resolve::Cycle(name.to_owned()));
        }

        let path = common_dir.join(name);
        current = match fs::read_to_string(&path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(error::Resolve::Io { path, source }),
            Ok(text) => text,
        };
    }
}

/// The commit `HEAD` points at, or `None` for an unborn branch.
///
/// `HEAD` is per-work-tree and lives in the location's own metadata
/// directory; the refs it names live under the common directory.
pub fn head(location: &Location) -> Result<Option<Oid>, error::Resolve> {
    let path = location.git_dir().join("HEAD");
    let text = fs::read_to_string(&path).map_err(|source| error::Resolve::Io { path, source })?;
    resolve(&text, location.common_dir())
}

fn as_object_id(s: &str) -> Option<Oid> {
    (s.len() == crate::oid::HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()))
        .then(|| s.parse().ok())
        .flatten()
}

fn trim_end(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_whitespace() || c.is_control())
}
