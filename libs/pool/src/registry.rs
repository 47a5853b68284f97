//! Pool registry
//!
//! Owns the mapping from unordered asset pairs to pool identities and the
//! protocol fee administration. Identities are derived deterministically
//! from the registry identity and the sorted pair, so they are known before
//! the pool exists.

use crate::{Exchange, Pool, ShareLedger};
use amm::{pool_address, V2Math};
use std::collections::HashMap;
use tracing::info;
use types::{AmmError, Address, Event, Result};

/// Registered pools and fee administration
#[derive(Debug, Clone)]
pub struct Registry {
    identity: Address,
    fee_recipient: Address,
    fee_recipient_controller: Address,
    pools: HashMap<(Address, Address), Address>,
    all_pools: Vec<Address>,
}

impl Registry {
    pub fn new(identity: Address, controller: Address) -> Self {
        Self {
            identity,
            fee_recipient: Address::zero(),
            fee_recipient_controller: controller,
            pools: HashMap::new(),
            all_pools: Vec::new(),
        }
    }

    pub(crate) fn with_fee_recipient(mut self, recipient: Address) -> Self {
        self.fee_recipient = recipient;
        self
    }

    pub fn identity(&self) -> Address {
        self.identity
    }

    /// Protocol fee recipient; the null identity means the fee is off
    pub fn fee_recipient(&self) -> Address {
        self.fee_recipient
    }

    pub fn fee_recipient_controller(&self) -> Address {
        self.fee_recipient_controller
    }

    /// Pool for the pair in either order, `None` when unregistered
    pub fn get_pool(&self, asset_a: Address, asset_b: Address) -> Option<Address> {
        self.pools.get(&(asset_a, asset_b)).copied()
    }

    pub fn all_pools(&self) -> &[Address] {
        &self.all_pools
    }

    pub fn all_pools_length(&self) -> usize {
        self.all_pools.len()
    }

    /// Record a new pool for the pair.
    ///
    /// Returns `(asset0, asset1, pool)` with the assets in canonical order.
    pub(crate) fn register(
        &mut self,
        asset_a: Address,
        asset_b: Address,
    ) -> Result<(Address, Address, Address)> {
        let (asset0, asset1) = V2Math::sort_tokens(asset_a, asset_b)?;
        if self.pools.contains_key(&(asset0, asset1)) {
            return Err(AmmError::PairExists);
        }

        let pool = pool_address(self.identity, asset0, asset1)?;
        self.pools.insert((asset0, asset1), pool);
        self.pools.insert((asset1, asset0), pool);
        self.all_pools.push(pool);
        Ok((asset0, asset1, pool))
    }

    pub(crate) fn set_fee_recipient(&mut self, caller: Address, recipient: Address) -> Result<()> {
        self.ensure_controller(caller)?;
        self.fee_recipient = recipient;
        Ok(())
    }

    pub(crate) fn set_fee_recipient_controller(
        &mut self,
        caller: Address,
        controller: Address,
    ) -> Result<()> {
        self.ensure_controller(caller)?;
        self.fee_recipient_controller = controller;
        Ok(())
    }

    fn ensure_controller(&self, caller: Address) -> Result<()> {
        if caller != self.fee_recipient_controller {
            return Err(AmmError::Forbidden);
        }
        Ok(())
    }
}

impl Exchange {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn get_pool(&self, asset_a: Address, asset_b: Address) -> Option<Address> {
        self.registry.get_pool(asset_a, asset_b)
    }

    /// Create the pool for a pair of distinct, non-null assets
    pub fn create_pool(&mut self, asset_a: Address, asset_b: Address) -> Result<Address> {
        let (asset0, asset1, pool) = self.registry.register(asset_a, asset_b)?;
        let shares = ShareLedger::new(
            &self.share_metadata.name,
            &self.share_metadata.symbol,
            self.chain_id,
            pool,
        );
        self.pools
            .insert(pool, Pool::new(pool, self.registry.identity(), asset0, asset1, shares));

        let count = self.registry.all_pools_length() as u64;
        info!(pool = ?pool, asset0 = ?asset0, asset1 = ?asset1, count, "pool created");
        self.emit(Event::PoolCreated {
            asset0,
            asset1,
            pool,
            count,
        });
        Ok(pool)
    }

    pub fn set_fee_recipient(&mut self, caller: Address, recipient: Address) -> Result<()> {
        self.registry.set_fee_recipient(caller, recipient)?;
        info!(recipient = ?recipient, "protocol fee recipient updated");
        Ok(())
    }

    pub fn set_fee_recipient_controller(
        &mut self,
        caller: Address,
        controller: Address,
    ) -> Result<()> {
        self.registry.set_fee_recipient_controller(caller, controller)?;
        info!(controller = ?controller, "fee recipient controller updated");
        Ok(())
    }
}
