//! Exchange world state
//!
//! A single [`Exchange`] value holds every ledger, the registry, all pools,
//! the clock and the event log. Operations take `&mut self`, so calls are
//! strictly sequential; re-entry can only happen through a flash-swap
//! callback, which receives the same `&mut Exchange`.

use crate::{Pool, Registry, TokenLedger};
use amm::{ReserveSource, V2Math};
use exchange_config::{ExchangeConfig, ShareConfig};
use std::collections::HashMap;
use tracing::warn;
use types::{AmmError, Address, Event, Result, Timestamp, U256};

#[derive(Debug, Clone)]
pub struct Exchange {
    pub(crate) chain_id: u64,
    pub(crate) now: Timestamp,
    pub(crate) assets: HashMap<Address, TokenLedger>,
    pub(crate) native: TokenLedger,
    pub(crate) wrapped_native: Address,
    pub(crate) registry: Registry,
    pub(crate) pools: HashMap<Address, Pool>,
    pub(crate) share_metadata: ShareConfig,
    events: Vec<Event>,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new(&ExchangeConfig::default())
    }
}

impl Exchange {
    pub fn new(config: &ExchangeConfig) -> Self {
        let registry = Registry::new(config.registry.identity, config.registry.controller)
            .with_fee_recipient(config.registry.fee_recipient.unwrap_or_default());

        Self {
            chain_id: config.chain.chain_id,
            now: config.chain.genesis_timestamp,
            assets: HashMap::new(),
            native: TokenLedger::default(),
            wrapped_native: config.native.wrapped_identity,
            registry,
            pools: HashMap::new(),
            share_metadata: config.shares.clone(),
            events: Vec::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    /// Current clock in seconds
    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn set_time(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn advance_time(&mut self, seconds: Timestamp) {
        self.now = self.now.saturating_add(seconds);
    }

    /// Events emitted since the last [`Exchange::take_events`]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Run `call` all-or-nothing.
    ///
    /// On failure every ledger, pool, registry entry and event written by
    /// `call` is discarded and the error is returned unchanged. Nested calls
    /// roll back only their own work unless the outer call fails too.
    ///
    /// The event log is append-only within a call, so it is rolled back by
    /// truncating to its entry length rather than being snapshotted.
    pub fn atomic<T>(
        &mut self,
        operation: &'static str,
        call: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let events = std::mem::take(&mut self.events);
        let logged = events.len();
        let snapshot = self.clone();
        self.events = events;

        match call(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(operation, error = %err, "operation reverted");
                let mut events = std::mem::take(&mut self.events);
                events.truncate(logged);
                *self = snapshot;
                self.events = events;
                Err(err)
            }
        }
    }

    pub fn pool(&self, pool: Address) -> Result<&Pool> {
        self.pools.get(&pool).ok_or(AmmError::PoolNotFound(pool))
    }

    pub(crate) fn pool_mut(&mut self, pool: Address) -> Result<&mut Pool> {
        self.pools.get_mut(&pool).ok_or(AmmError::PoolNotFound(pool))
    }
}

impl ReserveSource for Exchange {
    fn reserves_for(&self, asset_a: Address, asset_b: Address) -> Result<(U256, U256)> {
        let (asset0, _) = V2Math::sort_tokens(asset_a, asset_b)?;
        let Some(address) = self.registry.get_pool(asset_a, asset_b) else {
            return Ok((U256::zero(), U256::zero()));
        };
        let (reserve0, reserve1, _) = self.pool(address)?.get_reserves();
        if asset_a == asset0 {
            Ok((reserve0, reserve1))
        } else {
            Ok((reserve1, reserve0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::label_address;

    #[test]
    fn test_atomic_restores_state_and_events() {
        let mut exchange = Exchange::default();
        let (token, alice) = (label_address("token"), label_address("alice"));
        exchange.mint_asset(token, alice, U256::from(10)).unwrap();
        let events_before = exchange.events().len();

        let result: Result<()> = exchange.atomic("test", |ex| {
            ex.mint_asset(token, alice, U256::from(5))?;
            Err(AmmError::K)
        });

        assert_eq!(result, Err(AmmError::K));
        assert_eq!(exchange.asset_balance(token, alice), U256::from(10));
        assert_eq!(exchange.events().len(), events_before);
    }

    #[test]
    fn test_rollback_keeps_history_and_drops_call_events() {
        let mut exchange = Exchange::default();
        let (token, alice, bob) = (
            label_address("token"),
            label_address("alice"),
            label_address("bob"),
        );
        exchange.mint_asset(token, alice, U256::from(10)).unwrap();
        let history = exchange.events().to_vec();

        let result: Result<()> = exchange.atomic("outer", |ex| {
            ex.transfer_asset(token, alice, bob, U256::from(4))?;
            let inner: Result<()> = ex.atomic("inner", |ex| {
                ex.mint_asset(token, bob, U256::from(1))?;
                Err(AmmError::Locked)
            });
            assert_eq!(inner, Err(AmmError::Locked));
            assert_eq!(ex.events().len(), history.len() + 1);
            Err(AmmError::K)
        });

        assert_eq!(result, Err(AmmError::K));
        assert_eq!(exchange.events(), history.as_slice());
        assert_eq!(exchange.asset_balance(token, bob), U256::zero());

        exchange.transfer_asset(token, alice, bob, U256::from(3)).unwrap();
        assert_eq!(exchange.events().len(), history.len() + 1);
        assert_eq!(
            exchange.events().last(),
            Some(&Event::Transfer {
                token,
                from: alice,
                to: bob,
                amount: U256::from(3),
            })
        );
    }

    #[test]
    fn test_inner_failure_can_be_absorbed() {
        let mut exchange = Exchange::default();
        let (token, alice) = (label_address("token"), label_address("alice"));

        exchange
            .atomic("outer", |ex| {
                ex.mint_asset(token, alice, U256::from(1))?;
                let inner: Result<()> = ex.atomic("inner", |ex| {
                    ex.mint_asset(token, alice, U256::from(100))?;
                    Err(AmmError::Locked)
                });
                assert!(inner.is_err());
                Ok(())
            })
            .unwrap();

        assert_eq!(exchange.asset_balance(token, alice), U256::one());
    }

    #[test]
    fn test_configured_fee_recipient_is_applied() {
        let mut config = ExchangeConfig::default();
        let treasury = label_address("treasury");
        config.registry.fee_recipient = Some(treasury);
        config.chain.chain_id = 31337;

        let exchange = Exchange::new(&config);
        assert_eq!(exchange.registry().fee_recipient(), treasury);
        assert_eq!(exchange.chain_id(), 31337);
        assert_eq!(exchange.now(), config.chain.genesis_timestamp);
    }

    #[test]
    fn test_missing_pool_reports_zero_reserves() {
        let exchange = Exchange::default();
        let (a, b) = (label_address("a"), label_address("b"));
        assert_eq!(
            exchange.reserves_for(a, b).unwrap(),
            (U256::zero(), U256::zero())
        );
        assert_eq!(exchange.reserves_for(a, a), Err(AmmError::IdenticalAddresses));
    }
}
