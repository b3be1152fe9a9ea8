// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The nested-repository manifest (`.gitmodules`) and its per-entry
//! validation.
//!
//! A manifest entry that fails validation is excluded from enumeration
//! and reported as a [`Diagnostic`] instead; one bad entry never hides
//! the rest.

use std::path::Path;

use url::Url;

use crate::{
    config::Config,
    discover::{self, Location},
    oid::Oid,
    refs,
    repo::Repository,
};

pub const MANIFEST_FILE: &str = ".gitmodules";

pub mod error {
    use thiserror::Error;

    use crate::config;

    #[derive(Debug, Error)]
    pub enum Index {
        #[error("repository has no working directory")]
        NoWorkdir,

        #[error(transparent)]
        Config(#[from] config::error::Load),
    }
}

/// A validated manifest entry with its resolved metadata directory.
#[derive(Clone, Debug)]
pub struct Submodule {
    name: String,
    path: String,
    url: String,
    location: Location,
}

impl Submodule {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The manifest path, relative to the superproject working directory.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The submodule's own directory triple. Its working directory is
    /// always set: it is the manifest path resolved against the
    /// superproject working directory.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn workdir(&self) -> &Path {
        self.location
            .workdir()
            .expect("submodule locations always carry a workdir")
    }

    /// The commit the submodule's `HEAD` resolves to.
    pub fn head(&self) -> Result<Option<Oid>, refs::error::Resolve> {
        refs::head(&self.location)
    }
}

/// Why a manifest entry was excluded from enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// `path` missing, or blank once trimmed.
    InvalidPath { name: String },

    /// `url` missing, blank, or not parseable as an absolute or relative
    /// URI.
    InvalidUrl { name: String },

    /// The entry's own metadata directory could not be resolved.
    GitDirUnavailable { name: String, path: String },
}

impl Diagnostic {
    /// The manifest entry the diagnostic names.
    pub fn name(&self) -> &str {
        match self {
            Self::InvalidPath { name }
            | Self::InvalidUrl { name }
            | Self::GitDirUnavailable { name, .. } => name,
        }
    }
}

/// The outcome of reading one manifest: usable entries in manifest order,
/// and one diagnostic per rejected entry.
#[derive(Clone, Debug, Default)]
pub struct Index {
    submodules: Vec<Submodule>,
    diagnostics: Vec<Diagnostic>,
}

impl Index {
    pub fn submodules(&self) -> &[Submodule] {
        &self.submodules
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

pub(crate) fn index(repo: &Repository) -> Result<Index, error::Index> {
    let workdir = repo.workdir().ok_or(error::Index::NoWorkdir)?;
    index_at(workdir)
}

/// Read the manifest under `workdir`. Needs no opened repository: entry
/// validation touches only the manifest and each entry's `.git` entry.
pub(crate) fn index_at(workdir: &Path) -> Result<Index, error::Index> {
    let manifest = workdir.join(MANIFEST_FILE);
    if !manifest.is_file() {
        return Ok(Index::default());
    }
    let config = Config::load_plain(&manifest)?;

    let mut index = Index::default();
    for name in config.subsections("submodule") {
        match entry(&config, name, workdir) {
            Ok(submodule) => index.submodules.push(submodule),
            Err(diagnostic) => {
                tracing::warn!(name, ?diagnostic, "skipping submodule");
                index.diagnostics.push(diagnostic)
            },
        }
    }
    Ok(index)
}

fn entry(config: &Config, name: &str, workdir: &Path) -> Result<Submodule, Diagnostic> {
    let path = config
        .get("submodule", Some(name), "path")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Diagnostic::InvalidPath {
            name: name.to_owned(),
        })?;

    let url = config
        .get("submodule", Some(name), "url")
        .map(str::trim)
        .filter(|u| !u.is_empty() && is_uri(u))
        .ok_or_else(|| Diagnostic::InvalidUrl {
            name: name.to_owned(),
        })?;

    let full_path = workdir.join(path);
    let location =
        locate(&full_path).ok_or_else(|| Diagnostic::GitDirUnavailable {
            name: name.to_owned(),
            path: path.to_owned(),
        })?;

    Ok(Submodule {
        name: name.to_owned(),
        path: path.to_owned(),
        url: url.to_owned(),
        location,
    })
}

/// Resolve the entry's own metadata directory: a single-level `.git`
/// check at the entry path, no upward walk. Both the indirection-file
/// layout and the legacy in-tree `.git` directory are accepted.
fn locate(path: &Path) -> Option<Location> {
    let git_dir = discover::resolve_dot_git(path).ok().flatten()?;
    if !git_dir.is_dir() {
        return None;
    }
    let common_dir = discover::read_common_dir(&git_dir).ok()?;
    Some(Location::new(
        git_dir,
        common_dir,
        Some(path.to_path_buf()),
    ))
}

/// Accept anything the `url` crate can make sense of, absolutely or as a
/// base-relative reference. scp-like and plain path forms parse as
/// relative references here, which is what the manifest allows.
fn is_uri(s: &str) -> bool {
    match Url::parse(s) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
