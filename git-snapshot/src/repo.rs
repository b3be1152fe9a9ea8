// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The repository aggregate: a read-only snapshot of one repository's
//! metadata at one point in time.
//!
//! Nothing here re-checks the filesystem after construction. If the
//! underlying metadata changes, discard the snapshot and open again.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use url::Url;

use crate::{
    config::Config,
    discover::Location,
    format,
    oid::Oid,
    refs,
    remote,
    submodule,
};

pub mod error {
    use std::{io, path::PathBuf};

    use thiserror::Error;

    use crate::{config, format};

    #[derive(Debug, Error)]
    pub enum Open {
        #[error("metadata directory {} does not exist", path.display())]
        Missing { path: PathBuf },

        #[error("failed to canonicalize {}", path.display())]
        Canonicalize {
            path: PathBuf,
            #[source]
            source: io::Error,
        },

        #[error(transparent)]
        Config(#[from] config::error::Load),

        #[error(transparent)]
        Format(#[from] format::error::Format),
    }
}

/// An opened repository: its location and its parsed configuration.
#[derive(Clone, Debug)]
pub struct Repository {
    location: Location,
    config: Config,
    workdir: Option<PathBuf>,
}

impl Repository {
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The working directory, honouring a `core.worktree` override
    /// (resolved against the metadata directory) over the discovered one.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    /// The commit `HEAD` resolves to, or `None` for an unborn branch.
    pub fn head(&self) -> Result<Option<Oid>, refs::error::Resolve> {
        refs::head(&self.location)
    }

    /// Enumerate this repository's submodules together with per-entry
    /// diagnostics for the manifest entries that did not validate.
    pub fn submodules(&self) -> Result<submodule::Index, submodule::error::Index> {
        submodule::index(self)
    }

    /// The canonical URL of this repository's upstream: `origin` if
    /// configured, otherwise the first remote that has a `url`. `None`
    /// when there is no remote, no working directory to resolve relative
    /// forms against, or the URL fails normalization.
    pub fn remote_url(&self) -> Option<Url> {
        let workdir = self.workdir()?;
        let raw = self
            .config
            .get("remote", Some("origin"), "url")
            .or_else(|| {
                self.config
                    .subsections("remote")
                    .into_iter()
                    .find_map(|name| self.config.get("remote", Some(name), "url"))
            })?;
        remote::normalize(raw, workdir)
    }
}

/// Open the repository at `location`: read the shared configuration and
/// gate on the structural-format version. Structural failures abort the
/// open; a partially resolved repository is never returned.
pub fn open(location: Location) -> Result<Repository, error::Open> {
    if !location.git_dir().is_dir() {
        return Err(error::Open::Missing {
            path: location.git_dir().to_path_buf(),
        });
    }

    // Shared state, including the config file, lives in the common
    // directory; a linked work-tree's own metadata directory has neither.
    let config_path = location.common_dir().join("config");
    let config = if config_path.is_file() {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    format::check(&config)?;

    let workdir = config
        .get("core", None, "worktree")
        .map(|w| location.git_dir().join(w))
        .or_else(|| location.workdir().map(Path::to_path_buf));

    Ok(Repository {
        location,
        config,
        workdir,
    })
}

/// A caller-owned cache of opened repositories, keyed by canonical
/// metadata-directory path.
///
/// The core holds no global state; integrations that resolve the same
/// repository repeatedly within one session own one of these and decide
/// its lifetime.
#[derive(Clone, Default)]
pub struct Cache {
    inner: Arc<RwLock<HashMap<PathBuf, Arc<Repository>>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `location`, or return the previously opened snapshot for the
    /// same metadata directory.
    pub fn open(&self, location: Location) -> Result<Arc<Repository>, error::Open> {
        let key = fs::canonicalize(location.git_dir()).map_err(|source| {
            error::Open::Canonicalize {
                path: location.git_dir().to_path_buf(),
                source,
            }
        })?;

        if let Some(repo) = self.inner.read().get(&key) {
            return Ok(repo.clone());
        }

        let repo = Arc::new(open(location)?);
        let mut write = self.inner.write();
        // Lost the race: keep the snapshot that got there first.
        Ok(write.entry(key).or_insert(repo).clone())
    }
}
