//! Property-based testing strategies.
//!
//! Times are generated on a quarter-second grid so every value is exact in
//! binary floating point and range ends compare equal to the duration.

use proptest::prelude::*;
use serde_json::{json, Value};

/// Grid step of generated times, in seconds.
pub const TIME_STEP: f64 = 0.25;

/// Seconds at grid position `ticks`.
#[must_use]
pub fn grid_time(ticks: u32) -> f64 {
    f64::from(ticks) * TIME_STEP
}

/// Layered ranges over `[0, duration]` that always cover the whole span.
///
/// One full-span range is inserted at a random position among random
/// sub-ranges (zero-width ones included), so later ranges paint over it and
/// it paints over earlier ones.
pub fn arb_layered_ranges(max_ranges: usize) -> impl Strategy<Value = (f64, Vec<[f64; 2]>)> {
    (1_u32..=40).prop_flat_map(move |duration| {
        let sub_range = (0..=duration, 0..=duration).prop_map(|(a, b)| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            [grid_time(lo), grid_time(hi)]
        });
        (
            Just(grid_time(duration)),
            prop::collection::vec(sub_range, 0..max_ranges),
            any::<prop::sample::Index>(),
        )
            .prop_map(|(duration, mut ranges, at)| {
                let pos = at.index(ranges.len() + 1);
                ranges.insert(pos, [0.0, duration]);
                (duration, ranges)
            })
    })
}

/// Owner of `time` by brute force: the last non-empty range containing it.
#[must_use]
pub fn brute_force_owner(ranges: &[[f64; 2]], time: f64) -> Option<usize> {
    ranges
        .iter()
        .enumerate()
        .rev()
        .find(|(_, range)| range[0] < range[1] && range[0] <= time && time < range[1])
        .map(|(idx, _)| idx)
}

/// A time literal and the seconds it denotes.
pub fn arb_time_literal() -> impl Strategy<Value = (Value, f64)> {
    prop_oneof![
        (0_u32..600).prop_map(|n| (json!(format!("{n}F")), f64::from(n) / 60.0)),
        (0_u32..120).prop_map(|n| (json!(format!("{n}s")), f64::from(n))),
        (0_u32..20_000).prop_map(|n| (json!(format!("{n}ms")), f64::from(n) / 1000.0)),
        (0_u32..40).prop_map(|n| (json!(grid_time(n)), grid_time(n))),
    ]
}

/// A valid variable id.
pub fn arb_var_id() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z][A-Za-z0-9_]{0,7}", 1..=3)
        .prop_map(|parts| format!("#.{}", parts.join(".")))
}

/// A string that is never a valid variable id.
pub fn arb_bad_var_id() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{1,8}".prop_map(|name| format!("#{name}")),
        "[A-Za-z]{1,8}".prop_map(|name| format!("#.{name}.")),
        "[A-Za-z]{1,8}".prop_map(|name| format!("Var.{name}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brute_force_owner_prefers_last() {
        let ranges = [[0.0, 4.0], [1.0, 2.0], [1.5, 1.5]];
        assert_eq!(brute_force_owner(&ranges, 0.5), Some(0));
        assert_eq!(brute_force_owner(&ranges, 1.5), Some(1));
        assert_eq!(brute_force_owner(&ranges, 4.0), None);
    }

    proptest! {
        #[test]
        fn test_layered_ranges_cover_span((duration, ranges) in arb_layered_ranges(6)) {
            prop_assert!(ranges.iter().any(|r| r[0] == 0.0 && r[1] == duration));
            prop_assert!(ranges.iter().all(|r| r[0] <= r[1] && r[1] <= duration));
        }
    }
}
