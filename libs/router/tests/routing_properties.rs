//! Routing Property Tests
//!
//! Trading through the router can never create value for the trader, and
//! what the router quotes is exactly what it executes.

use amm::{DepositRequest, V2Math};
use exchange_config::ExchangeConfig;
use pool::Exchange;
use proptest::prelude::*;
use router::Router;
use types::{label_address, Address, U256};

struct Market {
    exchange: Exchange,
    router: Router,
    trader: Address,
    x: Address,
    y: Address,
    z: Address,
}

fn market(reserve_xy: (u64, u64), reserve_yz: (u64, u64)) -> Market {
    let config = ExchangeConfig::default();
    let mut exchange = Exchange::new(&config);
    let router = Router::from_config(&config);
    let (provider, trader) = (label_address("provider"), label_address("trader"));
    let (x, y, z) = (label_address("x"), label_address("y"), label_address("z"));

    for asset in [x, y, z] {
        for holder in [provider, trader] {
            exchange.mint_asset(asset, holder, U256::exp10(24)).unwrap();
            exchange
                .approve_asset(asset, holder, router.identity(), U256::MAX)
                .unwrap();
        }
    }

    let deadline = exchange.now();
    for (a, b, (ra, rb)) in [(x, y, reserve_xy), (y, z, reserve_yz)] {
        router
            .add_liquidity(
                &mut exchange,
                provider,
                a,
                b,
                DepositRequest::new(U256::from(ra), U256::from(rb), U256::zero(), U256::zero()),
                provider,
                deadline,
            )
            .unwrap();
    }

    Market {
        exchange,
        router,
        trader,
        x,
        y,
        z,
    }
}

prop_compose! {
    fn reserves()(a in 10_000u64..10_000_000_000, b in 10_000u64..10_000_000_000) -> (u64, u64) {
        (a, b)
    }
}

proptest! {
    #[test]
    fn prop_round_trip_never_profits(
        reserve_xy in reserves(),
        reserve_yz in reserves(),
        amount in 1u64..1_000_000_000,
    ) {
        let mut m = market(reserve_xy, reserve_yz);
        let start = m.exchange.asset_balance(m.x, m.trader);
        let deadline = m.exchange.now();

        let Ok(out) = m.router.swap_exact_tokens_for_tokens(
            &mut m.exchange, m.trader, U256::from(amount), U256::zero(),
            &[m.x, m.y, m.z], m.trader, deadline,
        ) else {
            return Ok(());
        };
        let received = out[2];
        if m.router.swap_exact_tokens_for_tokens(
            &mut m.exchange, m.trader, received, U256::zero(),
            &[m.z, m.y, m.x], m.trader, deadline,
        ).is_err() {
            return Ok(());
        }

        prop_assert!(m.exchange.asset_balance(m.x, m.trader) <= start);
    }

    #[test]
    fn prop_exact_input_delivers_quote(
        reserve_xy in reserves(),
        reserve_yz in reserves(),
        amount in 1u64..1_000_000_000,
    ) {
        let mut m = market(reserve_xy, reserve_yz);
        let path = [m.x, m.y, m.z];
        let Ok(quoted) = m.router.get_amounts_out(&m.exchange, U256::from(amount), &path) else {
            return Ok(());
        };
        let before = m.exchange.asset_balance(m.z, m.trader);
        let deadline = m.exchange.now();

        let executed = m.router.swap_exact_tokens_for_tokens(
            &mut m.exchange, m.trader, U256::from(amount), quoted[2], &path, m.trader, deadline,
        );

        prop_assert_eq!(executed.as_ref(), Ok(&quoted));
        prop_assert_eq!(m.exchange.asset_balance(m.z, m.trader) - before, quoted[2]);
    }

    #[test]
    fn prop_exact_output_never_exceeds_quoted_input(
        reserve_xy in reserves(),
        fraction in 1u64..500,
    ) {
        let mut m = market(reserve_xy, (1_000_000, 1_000_000));
        let amount_out = U256::from(reserve_xy.1) * U256::from(fraction) / U256::from(1_000);
        prop_assume!(!amount_out.is_zero());
        let before = m.exchange.asset_balance(m.x, m.trader);
        let deadline = m.exchange.now();
        let required = V2Math::get_amount_in(
            amount_out,
            U256::from(reserve_xy.0),
            U256::from(reserve_xy.1),
        ).unwrap();

        m.router.swap_tokens_for_exact_tokens(
            &mut m.exchange, m.trader, amount_out, required, &[m.x, m.y], m.trader, deadline,
        ).unwrap();

        prop_assert_eq!(before - m.exchange.asset_balance(m.x, m.trader), required);
    }
}
