// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Structural-format compatibility gate, run as part of opening a
//! repository.

use crate::config::Config;

/// Extension names we understand under format version 1. Config keys are
/// case-insensitive, so the parser has already lowercased them.
const KNOWN_EXTENSIONS: [&str; 4] = ["noop", "partialclone", "preciousobjects", "worktreeconfig"];

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum Format {
        #[error("unsupported repository format version {0}")]
        Version(String),

        #[error("unsupported repository extension `{0}`")]
        Extension(String),
    }
}

/// Accept version 0 unconditionally, version 1 only when every declared
/// extension is known. Anything else aborts the open.
pub fn check(config: &Config) -> Result<(), error::Format> {
    let version = config
        .get("core", None, "repositoryformatversion")
        .unwrap_or("0");

    match version {
        "0" => Ok(()),
        "1" => {
            for key in config.keys("extensions", None) {
                if !KNOWN_EXTENSIONS.contains(&key) {
                    return Err(error::Format::Extension(key.to_owned()));
                }
            }
            Ok(())
        },
        other => Err(error::Format::Version(other.to_owned())),
    }
}
