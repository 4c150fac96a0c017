//! Property tests for timeline partitioning.
//!
//! Every generated input is checked against a brute-force owner lookup.

use tp_core::timeline::{FragmentOpts, TimeFragment, TimelineRange};
use tp_test_utils::proptest::prelude::*;
use tp_test_utils::strategies::{arb_layered_ranges, brute_force_owner, grid_time, TIME_STEP};

// ==========================================================================
// Partition Properties
// ==========================================================================

proptest! {
    #[test]
    fn test_partition_matches_brute_force((duration, ranges) in arb_layered_ranges(8)) {
        let fragments = TimeFragment::partition(&ranges, "p", &FragmentOpts::new(duration)).unwrap();

        prop_assert_eq!(fragments.first().map(|f| f.begin), Some(0.0));
        prop_assert_eq!(fragments.last().map(|f| f.end), Some(duration));
        for pair in fragments.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].begin);
            prop_assert_ne!(pair[0].index, pair[1].index);
        }
        for fragment in &fragments {
            prop_assert!(fragment.begin < fragment.end);
            let mid = (fragment.begin + fragment.end) / 2.0;
            prop_assert_eq!(brute_force_owner(&ranges, mid), Some(fragment.index));
        }

        let mut ticks = 0;
        while grid_time(ticks) < duration {
            let time = grid_time(ticks) + TIME_STEP / 2.0;
            let owner = fragments.iter().find(|f| f.contains(time)).map(|f| f.index);
            prop_assert_eq!(owner, brute_force_owner(&ranges, time));
            ticks += 1;
        }
    }

    #[test]
    fn test_partition_rejects_short_end((duration, ranges) in arb_layered_ranges(4)) {
        let longer = FragmentOpts::new(duration + TIME_STEP);
        prop_assert!(TimeFragment::partition(&ranges, "p", &longer).is_err());
    }

    #[test]
    fn test_timeline_value_at_follows_owner((duration, ranges) in arb_layered_ranges(6)) {
        let fragments = TimeFragment::partition(&ranges, "p", &FragmentOpts::new(duration)).unwrap();
        let values: Vec<usize> = (0..ranges.len()).collect();
        let timeline = TimelineRange::from_parts(fragments, values);
        prop_assert_eq!(timeline.value_at(0.0).copied(), brute_force_owner(&ranges, 0.0));
    }
}

// ==========================================================================
// Fixed Cases
// ==========================================================================

#[test]
fn test_partition_gap_is_rejected() {
    let err = TimeFragment::partition(&[[0.0, 1.0], [2.0, 3.0]], "p", &FragmentOpts::new(3.0)).unwrap_err();
    assert_eq!(err.to_string(), "p: Invalid time fragment (overlap)");
}

#[test]
fn test_partition_tail_window() {
    let opts = FragmentOpts::with_tail(2.0, 7.0);
    let fragments = TimeFragment::partition(&[[0.0, 1.5], [1.5, 3.0]], "p", &opts).unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[1].end, 3.0);

    let err = TimeFragment::partition(&[[0.0, 1.5]], "p", &opts).unwrap_err();
    assert_eq!(err.to_string(), "p: Invalid time fragment (end)");
}
