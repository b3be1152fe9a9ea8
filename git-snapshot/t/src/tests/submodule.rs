// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use git_snapshot::{
    discover::discover,
    repo,
    submodule::{error, Diagnostic},
};
use pretty_assertions::assert_eq;

use crate::fixture::{self, SHA1, SHA2};

/// A superproject with one checked-out submodule at `rel_path`, wired
/// the modern way: gitdir under `.git/modules/<name>`, indirection file
/// in the submodule working directory.
fn add_submodule(workdir: &std::path::Path, name: &str, rel_path: &str, head: &str) {
    let module = workdir.join(".git/modules").join(name);
    fixture::init_git_dir(&module, head);
    fixture::link_git_dir(&workdir.join(rel_path), &module);
}

#[test]
fn no_manifest_means_no_submodules() {
    let tmp = fixture::tmpdir();
    fixture::init_repo(&tmp, SHA1);

    let repo = repo::open(discover(&tmp).unwrap().unwrap()).unwrap();
    let index = repo.submodules().unwrap();
    assert!(index.submodules().is_empty());
    assert!(index.diagnostics().is_empty());
}

#[test]
fn bare_repository_has_no_submodule_index() {
    let tmp = fixture::tmpdir();
    let bare = tmp.join("project.git");
    fixture::init_git_dir(&bare, SHA1);

    let repo = repo::open(discover(&bare).unwrap().unwrap()).unwrap();
    assert_matches!(repo.submodules(), Err(error::Index::NoWorkdir))
}

#[test]
fn valid_entry_resolves_gitdir_and_head() {
    let tmp = fixture::tmpdir();
    fixture::init_repo(&tmp, SHA1);
    add_submodule(&tmp, "dep", "libs/dep", SHA2);
    fixture::write(
        tmp.join(".gitmodules"),
        &fixture::manifest_entry("dep", "libs/dep", "https://example.com/dep.git"),
    );

    let repo = repo::open(discover(&tmp).unwrap().unwrap()).unwrap();
    let index = repo.submodules().unwrap();
    assert_eq!(index.diagnostics(), &[]);

    let [sub] = index.submodules() else {
        panic!("expected exactly one submodule")
    };
    assert_eq!(sub.name(), "dep");
    assert_eq!(sub.path(), "libs/dep");
    assert_eq!(sub.url(), "https://example.com/dep.git");
    assert_eq!(sub.workdir(), tmp.join("libs/dep"));
    assert_eq!(sub.location().git_dir(), tmp.join(".git/modules/dep"));
    assert_eq!(sub.head().unwrap().unwrap().to_string(), SHA2);
}

#[test]
fn legacy_in_tree_gitdir_is_accepted() {
    let tmp = fixture::tmpdir();
    fixture::init_repo(&tmp, SHA1);
    fixture::init_repo(&tmp.join("vendor/old"), SHA2);
    fixture::write(
        tmp.join(".gitmodules"),
        &fixture::manifest_entry("old", "vendor/old", "../old.git"),
    );

    let repo = repo::open(discover(&tmp).unwrap().unwrap()).unwrap();
    let index = repo.submodules().unwrap();
    let [sub] = index.submodules() else {
        panic!("expected exactly one submodule")
    };
    assert_eq!(sub.location().git_dir(), tmp.join("vendor/old/.git"));
    assert_eq!(sub.head().unwrap().unwrap().to_string(), SHA2);
}

#[test]
fn rejected_entries_become_diagnostics_and_do_not_abort() {
    let tmp = fixture::tmpdir();
    fixture::init_repo(&tmp, SHA1);
    add_submodule(&tmp, "good", "good", SHA2);

    let manifest = [
        // whitespace-only path
        "[submodule \"blank\"]\n\tpath = \"  \"\n\turl = https://example.com/x\n".to_owned(),
        // no path at all
        "[submodule \"pathless\"]\n\turl = https://example.com/y\n".to_owned(),
        // unparseable url
        "[submodule \"badurl\"]\n\tpath = somewhere\n\turl = http://\n".to_owned(),
        // fine on paper, but never checked out
        fixture::manifest_entry("ghost", "missing", "https://example.com/ghost"),
        fixture::manifest_entry("good", "good", "https://example.com/good"),
    ]
    .concat();
    fixture::write(tmp.join(".gitmodules"), &manifest);

    let repo = repo::open(discover(&tmp).unwrap().unwrap()).unwrap();
    let index = repo.submodules().unwrap();

    let names: Vec<_> = index.submodules().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["good"]);

    assert_eq!(
        index.diagnostics(),
        &[
            Diagnostic::InvalidPath {
                name: "blank".to_owned()
            },
            Diagnostic::InvalidPath {
                name: "pathless".to_owned()
            },
            Diagnostic::InvalidUrl {
                name: "badurl".to_owned()
            },
            Diagnostic::GitDirUnavailable {
                name: "ghost".to_owned(),
                path: "missing".to_owned()
            },
        ]
    );
    assert_eq!(index.diagnostics()[3].name(), "ghost");
}

#[test]
fn scp_like_and_relative_manifest_urls_are_valid() {
    let tmp = fixture::tmpdir();
    fixture::init_repo(&tmp, SHA1);
    add_submodule(&tmp, "a", "a", SHA2);
    add_submodule(&tmp, "b", "b", SHA2);
    fixture::write(
        tmp.join(".gitmodules"),
        &[
            fixture::manifest_entry("a", "a", "git@github.com:org/a.git"),
            fixture::manifest_entry("b", "b", "../b.git"),
        ]
        .concat(),
    );

    let repo = repo::open(discover(&tmp).unwrap().unwrap()).unwrap();
    let index = repo.submodules().unwrap();
    assert_eq!(index.submodules().len(), 2);
    assert_eq!(index.diagnostics(), &[]);
}

#[test]
fn split_manifest_blocks_merge_field_by_field() {
    let tmp = fixture::tmpdir();
    fixture::init_repo(&tmp, SHA1);
    add_submodule(&tmp, "s2", "s2", SHA2);
    fixture::write(
        tmp.join(".gitmodules"),
        "[submodule \"s2\"]\n\tpath = s2\n\turl = https://example.com/a\n\
         [submodule \"s2\"]\n\turl = https://example.com/b\n",
    );

    let repo = repo::open(discover(&tmp).unwrap().unwrap()).unwrap();
    let index = repo.submodules().unwrap();
    let [sub] = index.submodules() else {
        panic!("expected exactly one submodule")
    };
    assert_eq!(sub.path(), "s2");
    assert_eq!(sub.url(), "https://example.com/b");
}
