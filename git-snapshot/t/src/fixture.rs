// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! On-disk repository fixtures. Everything here lays files down by hand:
//! the crate under test reads git's private formats, so the fixtures
//! write them.

use std::{
    fs,
    io,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

use tempfile::{tempdir, TempDir};

pub const SHA1: &str = "1111111111111111111111111111111111111111";
pub const SHA2: &str = "2222222222222222222222222222222222222222";
pub const SHA3: &str = "3333333333333333333333333333333333333333";

pub struct WithTmpDir<A> {
    _tmp: TempDir,
    inner: A,
}

impl<A> WithTmpDir<A> {
    pub fn new<F, E>(mk_inner: F) -> Result<Self, E>
    where
        F: FnOnce(&Path) -> Result<A, E>,
        E: From<io::Error>,
    {
        let tmp = tempdir()?;
        let inner = mk_inner(tmp.path())?;
        Ok(Self { _tmp: tmp, inner })
    }
}

impl<A> Deref for WithTmpDir<A> {
    type Target = A;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<A> DerefMut for WithTmpDir<A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

pub type TmpDir = WithTmpDir<PathBuf>;

/// A scratch directory whose canonical path is stable for the lifetime
/// of the fixture (symlinked temp roots are resolved up front, so path
/// comparisons in tests stay textual).
pub fn tmpdir() -> TmpDir {
    WithTmpDir::new(|path| fs::canonicalize(path)).unwrap()
}

/// Write `text` at `path`, creating parent directories as needed.
pub fn write(path: impl AsRef<Path>, text: &str) {
    let path = path.as_ref();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// A minimal checkout: `workdir/.git` holding a `HEAD` on
/// `refs/heads/main` pointing at `head`.
pub fn init_repo(workdir: &Path, head: &str) {
    init_git_dir(&workdir.join(".git"), head)
}

/// A metadata directory alone (what a submodule's gitdir or a bare
/// repository looks like).
pub fn init_git_dir(git_dir: &Path, head: &str) {
    write(git_dir.join("HEAD"), "ref: refs/heads/main\n");
    write(
        git_dir.join("refs/heads/main"),
        &format!("{}\n", head),
    );
    write(
        git_dir.join("config"),
        "[core]\n\trepositoryformatversion = 0\n",
    );
}

/// Point `workdir/.git` at `git_dir` with an indirection file, the way
/// git checks out submodules and linked work-trees.
pub fn link_git_dir(workdir: &Path, git_dir: &Path) {
    write(
        workdir.join(".git"),
        &format!("gitdir: {}\n", git_dir.display()),
    );
}

/// One manifest block for `.gitmodules`.
pub fn manifest_entry(name: &str, path: &str, url: &str) -> String {
    format!(
        "[submodule \"{}\"]\n\tpath = {}\n\turl = {}\n",
        name, path, url
    )
}
