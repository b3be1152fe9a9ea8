// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mapping arbitrary absolute paths to the nearest enclosing repository.
//!
//! A path-segment trie is built once per top-level repository snapshot:
//! the top-level working directory carries the opened [`Repository`],
//! every accepted submodule working directory carries a lazily opened
//! one. Children are kept ordered under an injected case rule so lookup
//! and insertion are binary searches.

use std::{
    cmp::Ordering,
    path::Path,
    sync::Arc,
};

use once_cell::sync::OnceCell;

use crate::{
    discover::Location,
    repo::{self, Repository},
    submodule,
};

/// How deep a chain of nested manifests we are willing to follow.
const MAX_NESTING: usize = 10;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum Build {
        #[error("repository has no working directory")]
        NoWorkdir,
    }
}

/// How path segments compare. Injected rather than probed per call site,
/// so both modes are exercisable on any host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCase {
    Sensitive,
    Insensitive,
}

impl PathCase {
    /// The conventional rule for the running platform.
    pub fn platform() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }

    fn cmp(&self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Sensitive => a.cmp(b),
            Self::Insensitive => a
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase)),
        }
    }
}

enum Slot {
    Open(Arc<Repository>),
    Lazy {
        location: Location,
        cell: OnceCell<Option<Arc<Repository>>>,
    },
}

impl Slot {
    /// The attached repository, opening a lazy slot at most once. A slot
    /// whose open fails memoizes `None`; the failure would recur
    /// identically on retry unless the on-disk state changed.
    fn get(&self) -> Option<Arc<Repository>> {
        match self {
            Self::Open(repo) => Some(repo.clone()),
            Self::Lazy { location, cell } => cell
                .get_or_init(|| match repo::open(location.clone()) {
                    Ok(repo) => Some(Arc::new(repo)),
                    Err(e) => {
                        tracing::warn!(
                            git_dir = %location.git_dir().display(),
                            err = %e,
                            "failed to open nested repository"
                        );
                        None
                    },
                })
                .clone(),
        }
    }
}

struct Node {
    segment: String,
    children: Vec<Node>,
    slot: Option<Slot>,
}

impl Node {
    fn new(segment: String) -> Self {
        Self {
            segment,
            children: Vec::new(),
            slot: None,
        }
    }

    fn child(&self, segment: &str, case: PathCase) -> Option<&Node> {
        self.children
            .binary_search_by(|c| case.cmp(&c.segment, segment))
            .ok()
            .map(|at| &self.children[at])
    }

    fn child_mut(&mut self, segment: &str, case: PathCase) -> &mut Node {
        match self
            .children
            .binary_search_by(|c| case.cmp(&c.segment, segment))
        {
            Ok(at) => &mut self.children[at],
            Err(at) => {
                self.children.insert(at, Node::new(segment.to_owned()));
                &mut self.children[at]
            },
        }
    }
}

/// The classifier for one top-level repository snapshot.
pub struct Classifier {
    root: Node,
    case: PathCase,
}

impl Classifier {
    /// Build the trie from an opened top-level repository and its
    /// submodule index.
    pub fn build(
        repo: Arc<Repository>,
        index: &submodule::Index,
        case: PathCase,
    ) -> Result<Self, error::Build> {
        let workdir = repo
            .workdir()
            .ok_or(error::Build::NoWorkdir)?
            .to_path_buf();

        let mut this = Self {
            root: Node::new(String::new()),
            case,
        };
        this.insert(&workdir, Slot::Open(repo));
        this.insert_submodules(index, MAX_NESTING);
        Ok(this)
    }

    /// Insert every accepted submodule working directory, recursing into
    /// each one's own manifest. Only manifests are read here; the nested
    /// repositories themselves stay unopened until first queried.
    fn insert_submodules(&mut self, index: &submodule::Index, depth: usize) {
        if depth == 0 {
            tracing::warn!("submodule nesting exceeds {MAX_NESTING}, ignoring deeper entries");
            return;
        }
        for submodule in index.submodules() {
            self.insert(
                submodule.workdir(),
                Slot::Lazy {
                    location: submodule.location().clone(),
                    cell: OnceCell::new(),
                },
            );
            if let Ok(nested) = submodule::index_at(submodule.workdir()) {
                self.insert_submodules(&nested, depth - 1)
            }
        }
    }

    fn insert(&mut self, path: &Path, slot: Slot) {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.child_mut(&segment, self.case);
        }
        node.slot = Some(slot)
    }

    /// The nearest enclosing repository of `path`, if any.
    ///
    /// All segments but the last are matched (a path cannot be its own
    /// containing repository), tracking the deepest visited node with a
    /// repository attached; nesting therefore resolves to the innermost
    /// enclosing repository.
    pub fn containing_repository(&self, path: &Path) -> Option<Arc<Repository>> {
        let segments = segments(path);
        let mut node = &self.root;
        let mut tracked: Option<&Slot> = None;

        for segment in segments.iter().rev().skip(1).rev() {
            node = match node.child(segment, self.case) {
                Some(child) => child,
                None => break,
            };
            if let Some(slot) = &node.slot {
                tracked = Some(slot)
            }
        }

        tracked.and_then(Slot::get)
    }
}

/// Platform-appropriate path segments: the root (or drive prefix) first,
/// then each named component.
fn segments(path: &Path) -> Vec<String> {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
}
