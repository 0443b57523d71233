// tests/snapshot_properties.rs

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use hotload::watch::{diff, ChangeSnapshot};
use proptest::prelude::*;

fn snapshot_strategy() -> impl Strategy<Value = ChangeSnapshot> {
    proptest::collection::btree_map(0u8..12, 0u64..4, 0..10).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, secs)| {
                (
                    PathBuf::from(format!("/w/f{name}.txt")),
                    SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn diff_is_reflexive(s in snapshot_strategy()) {
        prop_assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn diff_is_symmetric(a in snapshot_strategy(), b in snapshot_strategy()) {
        prop_assert_eq!(diff(&a, &b), diff(&b, &a));
    }

    #[test]
    fn diff_is_empty_only_for_equal_snapshots(a in snapshot_strategy(), b in snapshot_strategy()) {
        prop_assert_eq!(diff(&a, &b).is_empty(), a == b);
    }
}
