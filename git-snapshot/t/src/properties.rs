// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use proptest::prelude::*;

use git_snapshot::{refs, Config, Oid};

use crate::fixture;

proptest! {
    /// Any 40-hex string resolves to itself, and resolving the result
    /// again is a no-op.
    #[test]
    fn object_ids_resolve_to_themselves(s in "[0-9a-f]{40}") {
        let tmp = fixture::tmpdir();

        let oid = refs::resolve(&s, &tmp).unwrap().unwrap();
        prop_assert_eq!(oid.to_string(), s);

        let again = refs::resolve(&oid.to_string(), &tmp).unwrap().unwrap();
        prop_assert_eq!(again, oid);
    }

    #[test]
    fn object_ids_parse_case_insensitively(s in "[0-9A-F]{40}") {
        let oid = s.parse::<Oid>().unwrap();
        prop_assert_eq!(oid.to_string(), s.to_lowercase());
    }

    #[test]
    fn wrong_length_never_parses(s in "[0-9a-f]{0,39}") {
        prop_assert!(s.parse::<Oid>().is_err());
    }

    /// Scalar lookup returns the last assignment; enumeration returns
    /// every assignment in order.
    #[test]
    fn config_last_value_wins(values in proptest::collection::vec("[a-z0-9]{1,8}", 1..8)) {
        let mut text = String::from("[a]\n");
        for v in &values {
            text.push_str(&format!("k = {}\n", v));
        }

        let config = text.parse::<Config>().unwrap();
        prop_assert_eq!(config.get("a", None, "k"), values.last().map(String::as_str));
        prop_assert_eq!(
            config.get_all("a", None, "k").collect::<Vec<_>>(),
            values.iter().map(String::as_str).collect::<Vec<_>>()
        );
    }
}
