// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    convert::TryFrom,
    fmt::{self, Display},
    str::FromStr,
};

use thiserror::Error;

pub const RAW_LEN: usize = 20;
pub const HEX_LEN: usize = RAW_LEN * 2;

/// A SHA-1 commit identifier, parsed from its 40-hex textual form.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Oid([u8; RAW_LEN]);

impl Oid {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("expected 40 hex characters, found {actual}")]
    Length { actual: usize },

    #[error("not a hexadecimal string")]
    Hex(#[from] hex::FromHexError),
}

impl FromStr for Oid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl TryFrom<&str> for Oid {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.len() != HEX_LEN {
            return Err(ParseError::Length { actual: s.len() });
        }
        let mut buf = [0u8; RAW_LEN];
        hex::decode_to_slice(s, &mut buf)?;
        Ok(Self(buf))
    }
}

impl AsRef<[u8]> for Oid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
