//! Property-based invariant tests for the settle spring.
//!
//! ## Invariants
//!
//! 1. Convergence: with default parameters the spring comes to rest within
//!    a bounded number of frames for any start, target and seed velocity.
//! 2. Exact landing: at rest, `value()` equals the target bit for bit.
//! 3. Finiteness: no step ever produces NaN or infinity.
//! 4. Frame-size independence: the resting position does not depend on
//!    whether time is fed in 8ms or 32ms steps.

use homesheet_core::Duration;
use homesheet_core::animation::{Animation, Spring};
use proptest::prelude::*;

fn arb_offset() -> impl Strategy<Value = f64> {
    (-2000i32..=2000).prop_map(|x| x as f64 * 0.5)
}

fn arb_velocity() -> impl Strategy<Value = f64> {
    (-8000i32..=8000).prop_map(f64::from)
}

fn run(mut spring: Spring, step: Duration, max_steps: usize) -> (Spring, usize) {
    for i in 0..max_steps {
        if spring.is_complete() {
            return (spring, i);
        }
        spring.tick(step);
        assert!(spring.value().is_finite(), "non-finite value at step {i}");
    }
    (spring, max_steps)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn spring_comes_to_rest_on_target(
        from in arb_offset(),
        to in arb_offset(),
        v in arb_velocity(),
    ) {
        let (spring, steps) = run(
            Spring::new(from, to).with_velocity(v),
            Duration::from_millis(16),
            2000,
        );
        prop_assert!(steps < 2000, "did not settle: {from} -> {to} @ {v}");
        prop_assert_eq!(spring.value().to_bits(), to.to_bits());
    }

    #[test]
    fn resting_position_ignores_frame_size(
        from in arb_offset(),
        to in arb_offset(),
        v in arb_velocity(),
    ) {
        let (fine, _) = run(Spring::new(from, to).with_velocity(v), Duration::from_millis(8), 4000);
        let (coarse, _) = run(Spring::new(from, to).with_velocity(v), Duration::from_millis(32), 1000);
        prop_assert_eq!(fine.value(), coarse.value());
    }
}
