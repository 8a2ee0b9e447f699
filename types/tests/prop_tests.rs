use proptest::prelude::*;

use quorum_types::{mul_div, EpochClock, Timestamp, PRECISION};

proptest! {
    /// Epoch numbers never decrease as time moves forward.
    #[test]
    fn epoch_at_is_monotonic(
        start in 0u64..1_000_000,
        period in 1u64..100_000,
        t1 in 0u64..10_000_000,
        dt in 0u64..10_000_000,
    ) {
        let clock = EpochClock::new(Timestamp::new(start), period).unwrap();
        let e1 = clock.epoch_at(Timestamp::new(t1));
        let e2 = clock.epoch_at(Timestamp::new(t1 + dt));
        prop_assert!(e2 >= e1, "epoch went backwards: {} -> {}", e1, e2);
    }

    /// Every timestamp at or after start lies inside the bounds of its own epoch.
    #[test]
    fn timestamp_falls_inside_its_epoch(
        start in 0u64..1_000_000,
        period in 1u64..100_000,
        offset in 0u64..10_000_000,
    ) {
        let clock = EpochClock::new(Timestamp::new(start), period).unwrap();
        let t = Timestamp::new(start + offset);
        let e = clock.epoch_at(t);
        prop_assert!(e >= 1);
        prop_assert!(clock.epoch_start(e) <= t);
        prop_assert!(t <= clock.epoch_end(e));
    }

    /// A share of a total, expressed in precision, never exceeds 100%.
    #[test]
    fn share_in_precision_bounded(total in 1u128..u128::MAX / 2, part_frac in 0u128..=1000) {
        let part = mul_div(total, part_frac, 1000).unwrap();
        let share = mul_div(part, PRECISION, total).unwrap();
        prop_assert!(share <= PRECISION);
    }
}
