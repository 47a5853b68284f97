//! Constant-Product Math Property Tests
//!
//! Rounding in every formula must favor the pool. These properties hold for
//! any reserves and amounts, not just the worked examples in the unit tests.

use amm::V2Math;
use proptest::prelude::*;
use types::U256;

prop_compose! {
    fn reserve()(value in 1_000u64..1_000_000_000_000) -> U256 {
        U256::from(value)
    }
}

proptest! {
    #[test]
    fn prop_quoted_input_always_buys_requested_output(
        reserve_in in reserve(),
        reserve_out in reserve(),
        fraction in 1u64..1_000,
    ) {
        let amount_out = (reserve_out * U256::from(fraction) / U256::from(1_000)).max(U256::one());
        prop_assume!(amount_out < reserve_out);

        let amount_in = V2Math::get_amount_in(amount_out, reserve_in, reserve_out).unwrap();
        let delivered = V2Math::get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
        prop_assert!(delivered >= amount_out);
    }

    #[test]
    fn prop_rebuying_output_never_costs_more(
        reserve_in in reserve(),
        reserve_out in reserve(),
        amount_in in 1u64..1_000_000_000,
    ) {
        let amount_in = U256::from(amount_in);
        let amount_out = V2Math::get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
        prop_assume!(!amount_out.is_zero());

        let required = V2Math::get_amount_in(amount_out, reserve_in, reserve_out).unwrap();
        prop_assert!(required <= amount_in);
    }

    #[test]
    fn prop_round_trip_never_favors_the_trader(
        reserve_a in reserve(),
        reserve_b in reserve(),
        amount_in in 1u64..1_000_000_000,
    ) {
        let amount_in = U256::from(amount_in);
        let received = V2Math::get_amount_out(amount_in, reserve_a, reserve_b).unwrap();
        prop_assume!(!received.is_zero());

        // Sell the proceeds back into the moved pool
        let back = V2Math::get_amount_out(received, reserve_b - received, reserve_a + amount_in);
        if let Ok(back) = back {
            prop_assert!(back <= amount_in);
        }
    }

    #[test]
    fn prop_output_never_reaches_reserve(
        reserve_in in reserve(),
        reserve_out in reserve(),
        amount_in in 1u64..u64::MAX,
    ) {
        let amount_out =
            V2Math::get_amount_out(U256::from(amount_in), reserve_in, reserve_out).unwrap();
        prop_assert!(amount_out < reserve_out);
    }

    #[test]
    fn prop_sqrt_is_floor(value in any::<u128>()) {
        let y = U256::from(value);
        let root = V2Math::sqrt(y);
        prop_assert!(root * root <= y);
        prop_assert!((root + 1) * (root + 1) > y);
    }
}
