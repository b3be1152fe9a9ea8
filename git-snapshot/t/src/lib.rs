// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

pub mod fixture;

#[cfg(test)]
mod properties;
