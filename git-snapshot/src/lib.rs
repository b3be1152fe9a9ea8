// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only resolution of a git working copy's on-disk metadata,
//! without invoking git or linking libgit2.
//!
//! The entry points mirror how a build integration would use this:
//! [`discover::discover`] finds the directory triple, [`repo::open`]
//! turns it into an immutable [`repo::Repository`] snapshot,
//! [`refs::head`] answers what commit `HEAD` is,
//! [`repo::Repository::submodules`] enumerates nested repositories, and
//! a [`classify::Classifier`] answers repeated "which repository owns
//! this path" queries against one snapshot.

pub mod classify;
pub mod config;
pub mod discover;
mod ext;
pub mod format;
pub mod oid;
pub mod refs;
pub mod remote;
pub mod repo;
pub mod submodule;

pub use classify::{Classifier, PathCase};
pub use config::Config;
pub use discover::{discover, Location};
pub use oid::Oid;
pub use repo::{Cache, Repository};
pub use submodule::{Diagnostic, Submodule};
