//! Deposits and withdrawals through the router
//!
//! Deposits are sized with [`DepositRequest::optimal_amounts`] against the
//! current reserves, pulled from the caller straight into the pool and
//! minted to `to`. Withdrawals pull shares into the pool, burn them and
//! check the proceeds against the caller's minimums.

use crate::Router;
use amm::{DepositRequest, ReserveSource, V2Math};
use pool::Exchange;
use tracing::info;
use types::{AmmError, Address, Event, Result, Signature, Timestamp, U256};

/// Shares to redeem and the least the caller accepts for each asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub shares: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
}

impl WithdrawRequest {
    pub fn new(shares: U256, amount_a_min: U256, amount_b_min: U256) -> Self {
        Self {
            shares,
            amount_a_min,
            amount_b_min,
        }
    }
}

/// Owner signature authorizing the router to pull shares.
///
/// With `approve_max` the signed value is `U256::MAX`, otherwise exactly the
/// shares being withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitApproval {
    pub approve_max: bool,
    pub signature: Signature,
}

impl Router {
    /// Deposit both assets at the pool's ratio, creating the pool on first use.
    ///
    /// Returns `(amount_a, amount_b, shares)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        request: DepositRequest,
        to: Address,
        deadline: Timestamp,
    ) -> Result<(U256, U256, U256)> {
        self.ensure(exchange, deadline)?;
        exchange.atomic("add_liquidity", |exchange| {
            let (pool, amount_a, amount_b) =
                self.deposit_amounts(exchange, asset_a, asset_b, &request)?;
            exchange.transfer_asset_from(asset_a, self.identity, caller, pool, amount_a)?;
            exchange.transfer_asset_from(asset_b, self.identity, caller, pool, amount_b)?;
            let shares = exchange.mint(pool, self.identity, to)?;

            info!(
                pool = ?pool,
                amount_a = %amount_a,
                amount_b = %amount_b,
                shares = %shares,
                "liquidity added"
            );
            exchange.emit(Event::LiquidityAdded {
                amount_a,
                amount_b,
                shares,
            });
            Ok((amount_a, amount_b, shares))
        })
    }

    /// Deposit `token` against attached native value.
    ///
    /// `value` is taken from the caller's native balance; whatever the
    /// optimal sizing does not use is refunded. Returns
    /// `(amount_token, amount_native, shares)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity_native(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        token: Address,
        value: U256,
        amount_token_desired: U256,
        amount_token_min: U256,
        amount_native_min: U256,
        to: Address,
        deadline: Timestamp,
    ) -> Result<(U256, U256, U256)> {
        self.ensure(exchange, deadline)?;
        let wrapped = self.wrapped_native;
        let request =
            DepositRequest::new(amount_token_desired, value, amount_token_min, amount_native_min);

        exchange.atomic("add_liquidity_native", |exchange| {
            exchange.send_native(caller, self.identity, value)?;
            let (pool, amount_token, amount_native) =
                self.deposit_amounts(exchange, token, wrapped, &request)?;
            exchange.transfer_asset_from(token, self.identity, caller, pool, amount_token)?;
            exchange.wrap_native(self.identity, amount_native)?;
            exchange.transfer_asset(wrapped, self.identity, pool, amount_native)?;
            let shares = exchange.mint(pool, self.identity, to)?;

            if value > amount_native {
                exchange.send_native(self.identity, caller, value - amount_native)?;
            }

            info!(
                pool = ?pool,
                amount_token = %amount_token,
                amount_native = %amount_native,
                shares = %shares,
                "native liquidity added"
            );
            exchange.emit(Event::NativeLiquidityAdded {
                amount_token,
                amount_native,
                shares,
            });
            Ok((amount_token, amount_native, shares))
        })
    }

    /// Redeem shares for both assets. Returns `(amount_a, amount_b)`.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        request: WithdrawRequest,
        to: Address,
        deadline: Timestamp,
    ) -> Result<(U256, U256)> {
        self.ensure(exchange, deadline)?;
        exchange.atomic("remove_liquidity", |exchange| {
            let (amount_a, amount_b) =
                self.withdraw(exchange, caller, asset_a, asset_b, &request, to)?;
            exchange.emit(Event::LiquidityRemoved { amount_a, amount_b });
            Ok((amount_a, amount_b))
        })
    }

    /// Redeem shares of a `token`/wrapped-native pool, paying the native side
    /// out as native value. Returns `(amount_token, amount_native)`.
    pub fn remove_liquidity_native(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        token: Address,
        request: WithdrawRequest,
        to: Address,
        deadline: Timestamp,
    ) -> Result<(U256, U256)> {
        self.ensure(exchange, deadline)?;
        exchange.atomic("remove_liquidity_native", |exchange| {
            self.withdraw_native(exchange, caller, token, &request, to)
        })
    }

    /// [`Router::remove_liquidity`] authorized by a signed permit in the same call
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity_with_permit(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        request: WithdrawRequest,
        to: Address,
        deadline: Timestamp,
        permit: PermitApproval,
    ) -> Result<(U256, U256)> {
        self.ensure(exchange, deadline)?;
        exchange.atomic("remove_liquidity_with_permit", |exchange| {
            let pool = self.pool_for(exchange, asset_a, asset_b)?;
            self.apply_permit(exchange, pool, caller, request.shares, deadline, &permit)?;
            let (amount_a, amount_b) =
                self.withdraw(exchange, caller, asset_a, asset_b, &request, to)?;
            exchange.emit(Event::LiquidityRemoved { amount_a, amount_b });
            Ok((amount_a, amount_b))
        })
    }

    /// [`Router::remove_liquidity_native`] authorized by a signed permit
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity_native_with_permit(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        token: Address,
        request: WithdrawRequest,
        to: Address,
        deadline: Timestamp,
        permit: PermitApproval,
    ) -> Result<(U256, U256)> {
        self.ensure(exchange, deadline)?;
        exchange.atomic("remove_liquidity_native_with_permit", |exchange| {
            let pool = self.pool_for(exchange, token, self.wrapped_native)?;
            self.apply_permit(exchange, pool, caller, request.shares, deadline, &permit)?;
            self.withdraw_native(exchange, caller, token, &request, to)
        })
    }

    /// Pool for the pair (created if missing) and the amounts to deposit
    fn deposit_amounts(
        &self,
        exchange: &mut Exchange,
        asset_a: Address,
        asset_b: Address,
        request: &DepositRequest,
    ) -> Result<(Address, U256, U256)> {
        let pool = match exchange.get_pool(asset_a, asset_b) {
            Some(pool) => pool,
            None => exchange.create_pool(asset_a, asset_b)?,
        };
        let (reserve_a, reserve_b) = exchange.reserves_for(asset_a, asset_b)?;
        let (amount_a, amount_b) = request.optimal_amounts(reserve_a, reserve_b)?;
        Ok((pool, amount_a, amount_b))
    }

    fn withdraw(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        request: &WithdrawRequest,
        to: Address,
    ) -> Result<(U256, U256)> {
        let pool = self.pool_for(exchange, asset_a, asset_b)?;
        exchange.transfer_shares_from(pool, self.identity, caller, pool, request.shares)?;
        let (amount0, amount1) = exchange.burn(pool, self.identity, to)?;

        let (asset0, _) = V2Math::sort_tokens(asset_a, asset_b)?;
        let (amount_a, amount_b) = if asset_a == asset0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < request.amount_a_min {
            return Err(AmmError::InsufficientAAmount);
        }
        if amount_b < request.amount_b_min {
            return Err(AmmError::InsufficientBAmount);
        }

        info!(
            pool = ?pool,
            shares = %request.shares,
            amount_a = %amount_a,
            amount_b = %amount_b,
            "liquidity removed"
        );
        Ok((amount_a, amount_b))
    }

    /// Withdraw to the router, then forward the token and unwrapped value
    fn withdraw_native(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        token: Address,
        request: &WithdrawRequest,
        to: Address,
    ) -> Result<(U256, U256)> {
        let (amount_token, amount_native) =
            self.withdraw(exchange, caller, token, self.wrapped_native, request, self.identity)?;
        exchange.transfer_asset(token, self.identity, to, amount_token)?;
        exchange.unwrap_native(self.identity, amount_native)?;
        exchange.send_native(self.identity, to, amount_native)?;

        exchange.emit(Event::NativeLiquidityRemoved {
            amount_token,
            amount_native,
        });
        Ok((amount_token, amount_native))
    }

    fn apply_permit(
        &self,
        exchange: &mut Exchange,
        pool: Address,
        owner: Address,
        shares: U256,
        deadline: Timestamp,
        permit: &PermitApproval,
    ) -> Result<()> {
        let value = if permit.approve_max { U256::MAX } else { shares };
        exchange.permit_shares(pool, owner, self.identity, value, deadline, &permit.signature)
    }
}
