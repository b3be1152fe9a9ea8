// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use git_snapshot::{
    discover::discover,
    refs::{self, error},
};
use pretty_assertions::assert_eq;

use crate::fixture::{self, SHA1, SHA2};

#[test]
fn direct_object_id() {
    let tmp = fixture::tmpdir();
    let oid = refs::resolve(SHA1, &tmp).unwrap().unwrap();
    assert_eq!(oid.to_string(), SHA1);
}

#[test]
fn trailing_whitespace_is_trimmed() {
    let tmp = fixture::tmpdir();
    let oid = refs::resolve(&format!("{}\n", SHA1), &tmp).unwrap().unwrap();
    assert_eq!(oid.to_string(), SHA1);
}

#[test]
fn symbolic_chain() {
    let tmp = fixture::tmpdir();
    fixture::write(tmp.join("refs/heads/a"), "ref: refs/heads/b\n");
    fixture::write(tmp.join("refs/heads/b"), &format!("{}\n", SHA2));

    let oid = refs::resolve("ref: refs/heads/a", &tmp).unwrap().unwrap();
    assert_eq!(oid.to_string(), SHA2);
}

#[test]
fn unborn_branch_is_none_not_an_error() {
    let tmp = fixture::tmpdir();
    assert_eq!(refs::resolve("ref: refs/heads/master", &tmp).unwrap(), None);
}

#[test]
fn cycle_is_detected() {
    let tmp = fixture::tmpdir();
    fixture::write(tmp.join("refs/heads/a"), "ref: refs/heads/b\n");
    fixture::write(tmp.join("refs/heads/b"), "ref: refs/heads/a\n");

    assert_matches!(
        refs::resolve("ref: refs/heads/a", &tmp),
        Err(error::Resolve::Cycle(name)) if name == "refs/heads/a"
    )
}

#[test]
fn malformed_shapes() {
    let tmp = fixture::tmpdir();
    // no space after the colon
    assert_matches!(
        refs::resolve("ref:refs/heads/x", &tmp),
        Err(error::Resolve::Malformed(_))
    );
    // two spaces
    assert_matches!(
        refs::resolve("ref:  refs/heads/x", &tmp),
        Err(error::Resolve::Malformed(_))
    );
    // not under refs/
    assert_matches!(
        refs::resolve("ref: heads/x", &tmp),
        Err(error::Resolve::Malformed(_))
    );
    // one hex digit short
    assert_matches!(
        refs::resolve(&SHA1[..39], &tmp),
        Err(error::Resolve::Malformed(_))
    );
    // right length, not hex
    assert_matches!(
        refs::resolve(&format!("{}g", &SHA1[..39]), &tmp),
        Err(error::Resolve::Malformed(_))
    );
}

#[test]
fn head_is_per_worktree_refs_are_shared() {
    let tmp = fixture::tmpdir();
    let main = tmp.join("main");
    fixture::init_repo(&main, SHA1);
    fixture::write(main.join(".git/refs/heads/topic"), &format!("{}\n", SHA2));

    let wt_git_dir = main.join(".git/worktrees/wt");
    fixture::write(wt_git_dir.join("HEAD"), "ref: refs/heads/topic\n");
    fixture::write(wt_git_dir.join("commondir"), "../..\n");
    let wt = tmp.join("wt");
    fixture::link_git_dir(&wt, &wt_git_dir);

    let main_loc = discover(&main).unwrap().unwrap();
    assert_eq!(refs::head(&main_loc).unwrap().unwrap().to_string(), SHA1);

    // The work-tree has its own HEAD, resolved against the shared refs.
    let wt_loc = discover(&wt).unwrap().unwrap();
    assert_eq!(refs::head(&wt_loc).unwrap().unwrap().to_string(), SHA2);
}

#[test]
fn head_of_unborn_repository() {
    let tmp = fixture::tmpdir();
    fixture::write(tmp.join("repo/.git/HEAD"), "ref: refs/heads/master\n");

    let loc = discover(&tmp.join("repo")).unwrap().unwrap();
    assert_eq!(refs::head(&loc).unwrap(), None);
}
