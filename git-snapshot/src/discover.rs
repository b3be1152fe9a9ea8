// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Locating a repository's directory triple from an arbitrary path.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use crate::ext::trim_metadata;

pub mod error {
    use std::{io, path::PathBuf};

    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum Discover {
        #[error("failed to read {}", path.display())]
        Io {
            path: PathBuf,
            #[source]
            source: io::Error,
        },

        #[error("malformed gitdir pointer in {}", path.display())]
        MalformedDotGit { path: PathBuf },

        #[error("malformed commondir file in {}", git_dir.display())]
        MalformedCommonDir { git_dir: PathBuf },
    }
}

/// A repository's directory triple.
///
/// `common_dir` equals `git_dir` unless a `commondir` file redirects it
/// (linked work-trees). `workdir` is absent when discovery started inside
/// a metadata directory, or for a bare repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    git_dir: PathBuf,
    common_dir: PathBuf,
    workdir: Option<PathBuf>,
}

impl Location {
    pub(crate) fn new(git_dir: PathBuf, common_dir: PathBuf, workdir: Option<PathBuf>) -> Self {
        Self {
            git_dir,
            common_dir,
            workdir,
        }
    }

    /// The per-work-tree metadata directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The shared metadata directory (`HEAD`-less state like refs and
    /// config lives here).
    pub fn common_dir(&self) -> &Path {
        &self.common_dir
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }
}

/// Walk upward from `start` until a repository is found.
///
/// A directory owning a `.git` entry (directory or indirection file) wins
/// and becomes the working directory. A directory which itself contains a
/// `HEAD` file is taken to be a metadata directory, with no working
/// directory even if an ancestor has a checkout: metadata-only context
/// cannot assume a working tree.
pub fn discover(start: &Path) -> Result<Option<Location>, error::Discover> {
    for candidate in start.ancestors() {
        tracing::trace!(candidate = %candidate.display(), "considering");

        if let Some(git_dir) = resolve_dot_git(candidate)? {
            let common_dir = read_common_dir(&git_dir)?;
            return Ok(Some(Location {
                git_dir,
                common_dir,
                workdir: Some(candidate.to_path_buf()),
            }));
        }

        if candidate.join("HEAD").is_file() {
            let git_dir = candidate.to_path_buf();
            let common_dir = read_common_dir(&git_dir)?;
            return Ok(Some(Location {
                git_dir,
                common_dir,
                workdir: None,
            }));
        }
    }
    Ok(None)
}

/// Resolve the `.git` entry of `dir`, if there is one.
///
/// A directory is the metadata directory itself. A file must hold a
/// `gitdir: ` pointer naming it, resolved relative to `dir`. Further
/// indirection behind the target is deliberately not followed: a pointer
/// chain does not move the already-established working directory.
pub(crate) fn resolve_dot_git(dir: &Path) -> Result<Option<PathBuf>, error::Discover> {
    let dot_git = dir.join(".git");
    match fs::metadata(&dot_git) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(error::Discover::Io {
            path: dot_git,
            source,
        }),

        Ok(meta) if meta.is_dir() => Ok(Some(dot_git)),
        Ok(_) => {
            let text = fs::read_to_string(&dot_git).map_err(|source| error::Discover::Io {
                path: dot_git.clone(),
                source,
            })?;
            let target = trim_metadata(&text)
                .strip_prefix("gitdir: ")
                .filter(|t| !t.is_empty())
                .ok_or(error::Discover::MalformedDotGit { path: dot_git })?;
            Ok(Some(dir.join(target)))
        },
    }
}

/// `git_dir/commondir`, when present, redirects shared state elsewhere.
pub(crate) fn read_common_dir(git_dir: &Path) -> Result<PathBuf, error::Discover> {
    let commondir = git_dir.join("commondir");
    match fs::read_to_string(&commondir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(git_dir.to_path_buf()),
        Err(source) => Err(error::Discover::Io {
            path: commondir,
            source,
        }),

        Ok(text) => {
            let target = trim_metadata(&text);
            if target.is_empty() {
                return Err(error::Discover::MalformedCommonDir {
                    git_dir: git_dir.to_path_buf(),
                });
            }
            Ok(git_dir.join(target))
        },
    }
}
