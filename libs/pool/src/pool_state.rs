//! Constant-product pool state machine
//!
//! Pools follow a push-then-call convention: callers move assets into the
//! pool first, then invoke [`Exchange::mint`] / [`Exchange::swap`] (or move
//! shares in and invoke [`Exchange::burn`]). The pool measures what arrived
//! by comparing its ledger balances with its recorded reserves.
//!
//! Every entry point runs under the pool's reentrancy flag and inside an
//! atomic section, so a failure anywhere, including inside a flash-swap
//! callback, leaves no trace.

use crate::{Exchange, ShareLedger};
use amm::{fixed_point, V2Math};
use exchange_config::protocol::{
    INVARIANT_FEE, INVARIANT_SCALE, MINIMUM_LIQUIDITY, PROTOCOL_FEE_ROOT_K_WEIGHT,
};
use tracing::{debug, info};
use types::{arith, block_timestamp, AmmError, Address, Event, Result, U256};

/// Receiver of an optimistic transfer made by [`Exchange::swap`].
///
/// Called after the requested outputs have been delivered and before the
/// invariant is checked. The implementation must leave the pool holding
/// enough input to satisfy it, typically by transferring assets to the pool.
pub trait FlashSwapCallee {
    fn on_flash_swap(
        &mut self,
        exchange: &mut Exchange,
        sender: Address,
        amount0_out: U256,
        amount1_out: U256,
        data: &[u8],
    ) -> Result<()>;
}

/// Callback request attached to a swap. Empty `data` skips the callback.
pub struct FlashSwap<'a> {
    pub callee: &'a mut dyn FlashSwapCallee,
    pub data: Vec<u8>,
}

/// State of one asset pair's pool
#[derive(Debug, Clone)]
pub struct Pool {
    address: Address,
    registry: Address,
    asset0: Address,
    asset1: Address,
    reserve0: U256,
    reserve1: U256,
    block_timestamp_last: u32,
    price0_cumulative_last: U256,
    price1_cumulative_last: U256,
    k_last: U256,
    pub(crate) shares: ShareLedger,
    locked: bool,
}

impl Pool {
    pub(crate) fn new(
        address: Address,
        registry: Address,
        asset0: Address,
        asset1: Address,
        shares: ShareLedger,
    ) -> Self {
        Self {
            address,
            registry,
            asset0,
            asset1,
            reserve0: U256::zero(),
            reserve1: U256::zero(),
            block_timestamp_last: 0,
            price0_cumulative_last: U256::zero(),
            price1_cumulative_last: U256::zero(),
            k_last: U256::zero(),
            shares,
            locked: false,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Registry that created this pool
    pub fn registry(&self) -> Address {
        self.registry
    }

    pub fn asset0(&self) -> Address {
        self.asset0
    }

    pub fn asset1(&self) -> Address {
        self.asset1
    }

    /// `(reserve0, reserve1, block_timestamp_last)`
    pub fn get_reserves(&self) -> (U256, U256, u32) {
        (self.reserve0, self.reserve1, self.block_timestamp_last)
    }

    /// Accumulated UQ112x112 price of asset0 in asset1, times seconds
    pub fn price0_cumulative_last(&self) -> U256 {
        self.price0_cumulative_last
    }

    pub fn price1_cumulative_last(&self) -> U256 {
        self.price1_cumulative_last
    }

    /// `reserve0 * reserve1` after the last liquidity event, zero while the
    /// protocol fee is off
    pub fn k_last(&self) -> U256 {
        self.k_last
    }

    pub fn shares(&self) -> &ShareLedger {
        &self.shares
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn snapshot(&self) -> (Address, Address, U256, U256) {
        (self.asset0, self.asset1, self.reserve0, self.reserve1)
    }
}

impl Exchange {
    pub fn get_reserves(&self, pool: Address) -> Result<(U256, U256, u32)> {
        Ok(self.pool(pool)?.get_reserves())
    }

    /// Issue shares for the assets pushed into the pool since the last update.
    ///
    /// The first deposit sets the price and permanently locks
    /// `MINIMUM_LIQUIDITY` shares with the null identity. Later deposits are
    /// credited at the less favorable of the two deposit ratios.
    pub fn mint(&mut self, pool: Address, caller: Address, to: Address) -> Result<U256> {
        self.atomic("mint", |exchange| {
            exchange.with_lock(pool, |exchange| exchange.mint_locked(pool, caller, to))
        })
    }

    /// Redeem the shares held by the pool itself for a pro-rata share of
    /// both reserves, paid to `to`.
    pub fn burn(&mut self, pool: Address, caller: Address, to: Address) -> Result<(U256, U256)> {
        self.atomic("burn", |exchange| {
            exchange.with_lock(pool, |exchange| exchange.burn_locked(pool, caller, to))
        })
    }

    /// Deliver the requested outputs to `to`, optionally call back into
    /// `flash`, then require that the fee-adjusted product of balances did
    /// not fall below the product of reserves.
    pub fn swap(
        &mut self,
        pool: Address,
        caller: Address,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
        flash: Option<FlashSwap<'_>>,
    ) -> Result<()> {
        self.atomic("swap", |exchange| {
            exchange.with_lock(pool, |exchange| {
                exchange.swap_locked(pool, caller, amount0_out, amount1_out, to, flash)
            })
        })
    }

    /// Send any balance above the reserves to `to`
    pub fn skim(&mut self, pool: Address, to: Address) -> Result<()> {
        self.atomic("skim", |exchange| {
            exchange.with_lock(pool, |exchange| {
                let (asset0, asset1, reserve0, reserve1) = exchange.pool(pool)?.snapshot();
                let excess0 = arith::sub(exchange.asset_balance(asset0, pool), reserve0)?;
                let excess1 = arith::sub(exchange.asset_balance(asset1, pool), reserve1)?;
                exchange.move_asset(asset0, pool, to, excess0)?;
                exchange.move_asset(asset1, pool, to, excess1)?;
                debug!(pool = ?pool, excess0 = %excess0, excess1 = %excess1, "skimmed");
                Ok(())
            })
        })
    }

    /// Overwrite the reserves with the current balances
    pub fn sync(&mut self, pool: Address) -> Result<()> {
        self.atomic("sync", |exchange| {
            exchange.with_lock(pool, |exchange| {
                let (asset0, asset1, reserve0, reserve1) = exchange.pool(pool)?.snapshot();
                let balance0 = exchange.asset_balance(asset0, pool);
                let balance1 = exchange.asset_balance(asset1, pool);
                exchange.update(pool, balance0, balance1, reserve0, reserve1)
            })
        })
    }

    /// Hold the pool's reentrancy flag for the duration of `call`
    fn with_lock<T>(
        &mut self,
        pool: Address,
        call: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        {
            let state = self.pool_mut(pool)?;
            if state.locked {
                return Err(AmmError::Locked);
            }
            state.locked = true;
        }

        let result = call(self);

        if let Some(state) = self.pools.get_mut(&pool) {
            state.locked = false;
        }
        result
    }

    fn mint_locked(&mut self, pool: Address, caller: Address, to: Address) -> Result<U256> {
        let (asset0, asset1, reserve0, reserve1) = self.pool(pool)?.snapshot();
        let balance0 = self.asset_balance(asset0, pool);
        let balance1 = self.asset_balance(asset1, pool);
        let amount0 = arith::sub(balance0, reserve0)?;
        let amount1 = arith::sub(balance1, reserve1)?;

        let fee_on = self.mint_protocol_fee(pool, reserve0, reserve1)?;
        // Read after the protocol fee, which may have grown the supply
        let total_supply = self.pool(pool)?.shares.total_supply();

        let liquidity = if total_supply.is_zero() {
            let root = V2Math::sqrt(arith::mul(amount0, amount1)?);
            let minimum = U256::from(MINIMUM_LIQUIDITY);
            if root <= minimum {
                return Err(AmmError::InsufficientLiquidityMinted);
            }
            self.mint_shares(pool, Address::zero(), minimum)?;
            root - minimum
        } else {
            let by0 = arith::div(arith::mul(amount0, total_supply)?, reserve0)?;
            let by1 = arith::div(arith::mul(amount1, total_supply)?, reserve1)?;
            by0.min(by1)
        };
        if liquidity.is_zero() {
            return Err(AmmError::InsufficientLiquidityMinted);
        }

        self.mint_shares(pool, to, liquidity)?;
        self.update(pool, balance0, balance1, reserve0, reserve1)?;
        if fee_on {
            self.record_k_last(pool)?;
        }

        info!(
            pool = ?pool,
            amount0 = %amount0,
            amount1 = %amount1,
            liquidity = %liquidity,
            "liquidity minted"
        );
        self.emit(Event::Mint {
            pool,
            sender: caller,
            amount0,
            amount1,
        });
        Ok(liquidity)
    }

    fn burn_locked(&mut self, pool: Address, caller: Address, to: Address) -> Result<(U256, U256)> {
        let (asset0, asset1, reserve0, reserve1) = self.pool(pool)?.snapshot();
        let balance0 = self.asset_balance(asset0, pool);
        let balance1 = self.asset_balance(asset1, pool);
        let liquidity = self.pool(pool)?.shares.balance_of(&pool);

        let fee_on = self.mint_protocol_fee(pool, reserve0, reserve1)?;
        let total_supply = self.pool(pool)?.shares.total_supply();
        if total_supply.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }

        let amount0 = arith::div(arith::mul(liquidity, balance0)?, total_supply)?;
        let amount1 = arith::div(arith::mul(liquidity, balance1)?, total_supply)?;
        if amount0.is_zero() || amount1.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }

        self.burn_shares(pool, pool, liquidity)?;
        self.move_asset(asset0, pool, to, amount0)?;
        self.move_asset(asset1, pool, to, amount1)?;

        let balance0 = self.asset_balance(asset0, pool);
        let balance1 = self.asset_balance(asset1, pool);
        self.update(pool, balance0, balance1, reserve0, reserve1)?;
        if fee_on {
            self.record_k_last(pool)?;
        }

        info!(
            pool = ?pool,
            amount0 = %amount0,
            amount1 = %amount1,
            liquidity = %liquidity,
            "liquidity burned"
        );
        self.emit(Event::Burn {
            pool,
            sender: caller,
            amount0,
            amount1,
            to,
        });
        Ok((amount0, amount1))
    }

    fn swap_locked(
        &mut self,
        pool: Address,
        caller: Address,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
        flash: Option<FlashSwap<'_>>,
    ) -> Result<()> {
        if amount0_out.is_zero() && amount1_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let (asset0, asset1, reserve0, reserve1) = self.pool(pool)?.snapshot();
        if amount0_out >= reserve0 || amount1_out >= reserve1 {
            return Err(AmmError::InsufficientLiquidity);
        }
        if to == asset0 || to == asset1 {
            return Err(AmmError::InvalidTo);
        }

        if !amount0_out.is_zero() {
            self.move_asset(asset0, pool, to, amount0_out)?;
        }
        if !amount1_out.is_zero() {
            self.move_asset(asset1, pool, to, amount1_out)?;
        }
        if let Some(FlashSwap { callee, data }) = flash {
            if !data.is_empty() {
                debug!(pool = ?pool, "invoking flash swap callback");
                callee.on_flash_swap(self, caller, amount0_out, amount1_out, &data)?;
            }
        }

        let balance0 = self.asset_balance(asset0, pool);
        let balance1 = self.asset_balance(asset1, pool);
        // Outputs are strictly below reserves, so these cannot underflow
        let floor0 = reserve0 - amount0_out;
        let floor1 = reserve1 - amount1_out;
        let amount0_in = if balance0 > floor0 { balance0 - floor0 } else { U256::zero() };
        let amount1_in = if balance1 > floor1 { balance1 - floor1 } else { U256::zero() };
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }

        let scale = U256::from(INVARIANT_SCALE);
        let fee = U256::from(INVARIANT_FEE);
        let adjusted0 = arith::sub(arith::mul(balance0, scale)?, arith::mul(amount0_in, fee)?)?;
        let adjusted1 = arith::sub(arith::mul(balance1, scale)?, arith::mul(amount1_in, fee)?)?;
        let k_before = arith::mul(arith::mul(reserve0, reserve1)?, arith::mul(scale, scale)?)?;
        if arith::mul(adjusted0, adjusted1)? < k_before {
            return Err(AmmError::K);
        }

        self.update(pool, balance0, balance1, reserve0, reserve1)?;

        debug!(
            pool = ?pool,
            amount0_in = %amount0_in,
            amount1_in = %amount1_in,
            amount0_out = %amount0_out,
            amount1_out = %amount1_out,
            "swap settled"
        );
        self.emit(Event::Swap {
            pool,
            sender: caller,
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
            to,
        });
        Ok(())
    }

    /// Record new reserves, accumulating the previous prices for the time
    /// they were in effect
    fn update(
        &mut self,
        pool: Address,
        balance0: U256,
        balance1: U256,
        reserve0: U256,
        reserve1: U256,
    ) -> Result<()> {
        let max = fixed_point::max_reserve();
        if balance0 > max || balance1 > max {
            return Err(AmmError::Overflow);
        }

        let timestamp = block_timestamp(self.now);
        let state = self.pool_mut(pool)?;
        let elapsed = timestamp.wrapping_sub(state.block_timestamp_last);
        if elapsed > 0 && !reserve0.is_zero() && !reserve1.is_zero() {
            let growth0 = fixed_point::price_increment(reserve1, reserve0, elapsed)?;
            let growth1 = fixed_point::price_increment(reserve0, reserve1, elapsed)?;
            state.price0_cumulative_last = state.price0_cumulative_last.overflowing_add(growth0).0;
            state.price1_cumulative_last = state.price1_cumulative_last.overflowing_add(growth1).0;
        }
        state.reserve0 = balance0;
        state.reserve1 = balance1;
        state.block_timestamp_last = timestamp;

        self.emit(Event::Sync {
            pool,
            reserve0: balance0,
            reserve1: balance1,
        });
        Ok(())
    }

    /// Mint the protocol's share of √k growth since the last liquidity event.
    ///
    /// Returns whether the fee is switched on.
    fn mint_protocol_fee(&mut self, pool: Address, reserve0: U256, reserve1: U256) -> Result<bool> {
        let recipient = self.registry.fee_recipient();
        let fee_on = !recipient.is_zero();
        let k_last = self.pool(pool)?.k_last;

        if !fee_on {
            if !k_last.is_zero() {
                self.pool_mut(pool)?.k_last = U256::zero();
            }
            return Ok(false);
        }
        if k_last.is_zero() {
            return Ok(true);
        }

        let root_k = V2Math::sqrt(arith::mul(reserve0, reserve1)?);
        let root_k_last = V2Math::sqrt(k_last);
        if root_k > root_k_last {
            let total_supply = self.pool(pool)?.shares.total_supply();
            let numerator = arith::mul(total_supply, root_k - root_k_last)?;
            let denominator = arith::add(
                arith::mul(root_k, U256::from(PROTOCOL_FEE_ROOT_K_WEIGHT))?,
                root_k_last,
            )?;
            let liquidity = arith::div(numerator, denominator)?;
            if !liquidity.is_zero() {
                self.mint_shares(pool, recipient, liquidity)?;
                debug!(
                    pool = ?pool,
                    recipient = ?recipient,
                    liquidity = %liquidity,
                    "protocol fee minted"
                );
            }
        }
        Ok(true)
    }

    fn record_k_last(&mut self, pool: Address) -> Result<()> {
        let state = self.pool_mut(pool)?;
        state.k_last = arith::mul(state.reserve0, state.reserve1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::label_address;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    struct Setup {
        exchange: Exchange,
        pool: Address,
        token0: Address,
        token1: Address,
        alice: Address,
    }

    fn setup() -> Setup {
        let mut exchange = Exchange::default();
        let (a, b) = (label_address("token-a"), label_address("token-b"));
        let pool = exchange.create_pool(a, b).unwrap();
        let (token0, token1) = {
            let state = exchange.pool(pool).unwrap();
            (state.asset0(), state.asset1())
        };
        let alice = label_address("alice");
        exchange.mint_asset(token0, alice, U256::exp10(24)).unwrap();
        exchange.mint_asset(token1, alice, U256::exp10(24)).unwrap();
        Setup {
            exchange,
            pool,
            token0,
            token1,
            alice,
        }
    }

    fn add_liquidity(s: &mut Setup, amount0: U256, amount1: U256) -> Result<U256> {
        s.exchange.transfer_asset(s.token0, s.alice, s.pool, amount0)?;
        s.exchange.transfer_asset(s.token1, s.alice, s.pool, amount1)?;
        s.exchange.mint(s.pool, s.alice, s.alice)
    }

    #[test]
    fn test_first_mint_locks_minimum_liquidity() {
        let mut s = setup();
        let minted = add_liquidity(&mut s, u(1_000_000), u(4_000_000)).unwrap();

        // sqrt(4e12) = 2e6
        assert_eq!(minted, u(2_000_000 - 1_000));
        assert_eq!(s.exchange.share_balance(s.pool, Address::zero()).unwrap(), u(1_000));
        assert_eq!(s.exchange.total_shares(s.pool).unwrap(), u(2_000_000));
        let (r0, r1, _) = s.exchange.get_reserves(s.pool).unwrap();
        assert_eq!((r0, r1), (u(1_000_000), u(4_000_000)));
    }

    #[test]
    fn test_first_mint_at_minimum_fails() {
        let mut s = setup();
        assert_eq!(
            add_liquidity(&mut s, u(1_000), u(1_000)),
            Err(AmmError::InsufficientLiquidityMinted)
        );
        assert_eq!(s.exchange.total_shares(s.pool).unwrap(), U256::zero());
    }

    #[test]
    fn test_later_mint_uses_smaller_ratio() {
        let mut s = setup();
        add_liquidity(&mut s, u(1_000_000), u(1_000_000)).unwrap();
        let minted = add_liquidity(&mut s, u(1_000), u(5_000)).unwrap();
        assert_eq!(minted, u(1_000));
    }

    #[test]
    fn test_burn_returns_pro_rata_amounts() {
        let mut s = setup();
        let minted = add_liquidity(&mut s, u(3_000_000), u(3_000_000)).unwrap();

        s.exchange
            .transfer_shares(s.pool, s.alice, s.pool, minted)
            .unwrap();
        let (out0, out1) = s.exchange.burn(s.pool, s.alice, s.alice).unwrap();

        assert_eq!((out0, out1), (u(2_999_000), u(2_999_000)));
        let (r0, r1, _) = s.exchange.get_reserves(s.pool).unwrap();
        assert_eq!((r0, r1), (u(1_000), u(1_000)));
        assert_eq!(s.exchange.total_shares(s.pool).unwrap(), u(1_000));
    }

    #[test]
    fn test_burn_without_shares_fails() {
        let mut s = setup();
        add_liquidity(&mut s, u(1_000_000), u(1_000_000)).unwrap();
        assert_eq!(
            s.exchange.burn(s.pool, s.alice, s.alice),
            Err(AmmError::InsufficientLiquidityBurned)
        );
    }

    #[test]
    fn test_swap_accepts_exact_quote_and_rejects_one_more() {
        let mut s = setup();
        add_liquidity(&mut s, u(5_000_000), u(10_000_000)).unwrap();
        let amount_in = u(100_000);
        let out = V2Math::get_amount_out(amount_in, u(5_000_000), u(10_000_000)).unwrap();

        s.exchange
            .transfer_asset(s.token0, s.alice, s.pool, amount_in)
            .unwrap();
        assert_eq!(
            s.exchange.swap(s.pool, s.alice, U256::zero(), out + 1, s.alice, None),
            Err(AmmError::K)
        );
        s.exchange
            .swap(s.pool, s.alice, U256::zero(), out, s.alice, None)
            .unwrap();

        let (r0, r1, _) = s.exchange.get_reserves(s.pool).unwrap();
        assert_eq!(r0, u(5_100_000));
        assert_eq!(r1, u(10_000_000) - out);
        assert!(matches!(
            s.exchange.events().last(),
            Some(Event::Swap { amount0_in, amount1_out, .. })
                if *amount0_in == amount_in && *amount1_out == out
        ));
    }

    #[test]
    fn test_swap_argument_checks() {
        let mut s = setup();
        add_liquidity(&mut s, u(1_000_000), u(1_000_000)).unwrap();

        assert_eq!(
            s.exchange.swap(s.pool, s.alice, U256::zero(), U256::zero(), s.alice, None),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(
            s.exchange.swap(s.pool, s.alice, u(1_000_000), U256::zero(), s.alice, None),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(
            s.exchange.swap(s.pool, s.alice, u(1), U256::zero(), s.token0, None),
            Err(AmmError::InvalidTo)
        );
        assert_eq!(
            s.exchange.swap(s.pool, s.alice, u(1), U256::zero(), s.alice, None),
            Err(AmmError::InsufficientInputAmount)
        );
        assert!(!s.exchange.pool(s.pool).unwrap().is_locked());
    }

    #[test]
    fn test_reserve_bound_is_enforced() {
        let mut s = setup();
        let too_big = fixed_point::max_reserve() + 1;
        s.exchange.mint_asset(s.token0, s.pool, too_big).unwrap();
        s.exchange.mint_asset(s.token1, s.pool, u(1_000_000)).unwrap();
        assert_eq!(s.exchange.mint(s.pool, s.alice, s.alice), Err(AmmError::Overflow));
    }

    #[test]
    fn test_price_accumulators_grow_with_time() {
        let mut s = setup();
        add_liquidity(&mut s, u(1_000_000), u(2_000_000)).unwrap();
        let start = s.exchange.now();

        s.exchange.advance_time(10);
        s.exchange.sync(s.pool).unwrap();

        let state = s.exchange.pool(s.pool).unwrap();
        let average0 = fixed_point::average_price(
            U256::zero(),
            state.price0_cumulative_last(),
            block_timestamp(start),
            block_timestamp(start + 10),
        )
        .unwrap();
        assert_eq!(fixed_point::consult(average0, u(100)).unwrap(), u(200));
        assert_eq!(
            fixed_point::consult(
                state.price1_cumulative_last() / U256::from(10),
                u(100)
            )
            .unwrap(),
            u(50)
        );
    }

    #[test]
    fn test_skim_and_sync() {
        let mut s = setup();
        add_liquidity(&mut s, u(1_000_000), u(1_000_000)).unwrap();
        let bob = label_address("bob");

        s.exchange.transfer_asset(s.token0, s.alice, s.pool, u(500)).unwrap();
        s.exchange.skim(s.pool, bob).unwrap();
        assert_eq!(s.exchange.asset_balance(s.token0, bob), u(500));

        s.exchange.transfer_asset(s.token1, s.alice, s.pool, u(700)).unwrap();
        s.exchange.sync(s.pool).unwrap();
        let (r0, r1, _) = s.exchange.get_reserves(s.pool).unwrap();
        assert_eq!((r0, r1), (u(1_000_000), u(1_000_700)));
    }

    #[test]
    fn test_unknown_pool() {
        let mut exchange = Exchange::default();
        let ghost = label_address("ghost");
        assert_eq!(
            exchange.mint(ghost, ghost, ghost),
            Err(AmmError::PoolNotFound(ghost))
        );
    }
}
