//! Multi-hop trades
//!
//! Amounts for the whole path are computed up front, the input is moved into
//! the first pool, and each hop's output is sent straight to the next pool.
//! Native-in routes wrap the attached value at the start; native-out routes
//! route the last hop to the router, unwrap, and forward the native value.

use crate::Router;
use amm::{get_amounts_in, get_amounts_out, V2Math};
use pool::Exchange;
use tracing::{debug, info};
use types::{AmmError, Address, Event, Result, SwapKind, Timestamp, U256};

impl Router {
    /// Sell exactly `amount_in` of `path[0]` for at least `amount_out_min` of
    /// the last asset
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_tokens(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<U256>> {
        self.ensure(exchange, deadline)?;
        exchange.atomic("swap_exact_tokens_for_tokens", |exchange| {
            let amounts = get_amounts_out(&*exchange, amount_in, path)?;
            if final_amount(&amounts) < amount_out_min {
                return Err(AmmError::InsufficientOutputAmount);
            }
            self.pull_input(exchange, caller, path, amounts[0])?;
            self.swap_along(exchange, &amounts, path, to)?;
            self.receipt(exchange, SwapKind::ExactTokensForTokens, &amounts);
            Ok(amounts)
        })
    }

    /// Buy exactly `amount_out` of the last asset for at most `amount_in_max`
    /// of `path[0]`
    #[allow(clippy::too_many_arguments)]
    pub fn swap_tokens_for_exact_tokens(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        amount_out: U256,
        amount_in_max: U256,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<U256>> {
        self.ensure(exchange, deadline)?;
        exchange.atomic("swap_tokens_for_exact_tokens", |exchange| {
            let amounts = get_amounts_in(&*exchange, amount_out, path)?;
            if amounts[0] > amount_in_max {
                return Err(AmmError::ExcessiveInputAmount);
            }
            self.pull_input(exchange, caller, path, amounts[0])?;
            self.swap_along(exchange, &amounts, path, to)?;
            self.receipt(exchange, SwapKind::TokensForExactTokens, &amounts);
            Ok(amounts)
        })
    }

    /// Sell all of the attached native `value`. `path` must start with the
    /// wrapped native asset.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_native_for_tokens(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        value: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<U256>> {
        self.ensure(exchange, deadline)?;
        self.ensure_native_first(path)?;
        exchange.atomic("swap_exact_native_for_tokens", |exchange| {
            let amounts = get_amounts_out(&*exchange, value, path)?;
            if final_amount(&amounts) < amount_out_min {
                return Err(AmmError::InsufficientOutputAmount);
            }
            exchange.send_native(caller, self.identity, value)?;
            self.push_native_input(exchange, path, amounts[0])?;
            self.swap_along(exchange, &amounts, path, to)?;
            self.receipt(exchange, SwapKind::ExactNativeForTokens, &amounts);
            Ok(amounts)
        })
    }

    /// Buy exactly `amount_out` native value. `path` must end with the
    /// wrapped native asset.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_tokens_for_exact_native(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        amount_out: U256,
        amount_in_max: U256,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<U256>> {
        self.ensure(exchange, deadline)?;
        self.ensure_native_last(path)?;
        exchange.atomic("swap_tokens_for_exact_native", |exchange| {
            let amounts = get_amounts_in(&*exchange, amount_out, path)?;
            if amounts[0] > amount_in_max {
                return Err(AmmError::ExcessiveInputAmount);
            }
            self.pull_input(exchange, caller, path, amounts[0])?;
            self.swap_along(exchange, &amounts, path, self.identity)?;
            self.release_native(exchange, to, final_amount(&amounts))?;
            self.receipt(exchange, SwapKind::TokensForExactNative, &amounts);
            Ok(amounts)
        })
    }

    /// Sell exactly `amount_in` of `path[0]` for native value. `path` must
    /// end with the wrapped native asset.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_native(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<U256>> {
        self.ensure(exchange, deadline)?;
        self.ensure_native_last(path)?;
        exchange.atomic("swap_exact_tokens_for_native", |exchange| {
            let amounts = get_amounts_out(&*exchange, amount_in, path)?;
            let amount_out = final_amount(&amounts);
            if amount_out < amount_out_min {
                return Err(AmmError::InsufficientOutputAmount);
            }
            self.pull_input(exchange, caller, path, amounts[0])?;
            self.swap_along(exchange, &amounts, path, self.identity)?;
            self.release_native(exchange, to, amount_out)?;
            self.receipt(exchange, SwapKind::ExactTokensForNative, &amounts);
            Ok(amounts)
        })
    }

    /// Buy exactly `amount_out` of the last asset with attached native
    /// `value`, refunding what the route did not need
    #[allow(clippy::too_many_arguments)]
    pub fn swap_native_for_exact_tokens(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        value: U256,
        amount_out: U256,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<U256>> {
        self.ensure(exchange, deadline)?;
        self.ensure_native_first(path)?;
        exchange.atomic("swap_native_for_exact_tokens", |exchange| {
            let amounts = get_amounts_in(&*exchange, amount_out, path)?;
            let amount_in = amounts[0];
            if amount_in > value {
                return Err(AmmError::ExcessiveInputAmount);
            }
            exchange.send_native(caller, self.identity, value)?;
            self.push_native_input(exchange, path, amount_in)?;
            self.swap_along(exchange, &amounts, path, to)?;
            if value > amount_in {
                exchange.send_native(self.identity, caller, value - amount_in)?;
            }
            self.receipt(exchange, SwapKind::NativeForExactTokens, &amounts);
            Ok(amounts)
        })
    }

    /// Execute every hop of `path` with the precomputed `amounts`.
    ///
    /// Each pool pays straight into the next pool; only the final hop pays
    /// `to`.
    fn swap_along(
        &self,
        exchange: &mut Exchange,
        amounts: &[U256],
        path: &[Address],
        to: Address,
    ) -> Result<()> {
        for (hop, pair) in path.windows(2).enumerate() {
            let (input, output) = (pair[0], pair[1]);
            let (asset0, _) = V2Math::sort_tokens(input, output)?;
            let amount_out = amounts[hop + 1];
            let (amount0_out, amount1_out) = if input == asset0 {
                (U256::zero(), amount_out)
            } else {
                (amount_out, U256::zero())
            };
            let recipient = match path.get(hop + 2) {
                Some(&next) => self.pool_for(exchange, output, next)?,
                None => to,
            };

            let pool = self.pool_for(exchange, input, output)?;
            debug!(
                hop,
                pool = ?pool,
                amount_out = %amount_out,
                recipient = ?recipient,
                "routing hop"
            );
            exchange.swap(pool, self.identity, amount0_out, amount1_out, recipient, None)?;
        }
        Ok(())
    }

    /// Move the caller's input into the first pool of `path`
    fn pull_input(
        &self,
        exchange: &mut Exchange,
        caller: Address,
        path: &[Address],
        amount: U256,
    ) -> Result<()> {
        let pool = self.pool_for(exchange, path[0], path[1])?;
        exchange.transfer_asset_from(path[0], self.identity, caller, pool, amount)
    }

    /// Wrap native value already held by the router into the first pool
    fn push_native_input(
        &self,
        exchange: &mut Exchange,
        path: &[Address],
        amount: U256,
    ) -> Result<()> {
        let pool = self.pool_for(exchange, path[0], path[1])?;
        exchange.wrap_native(self.identity, amount)?;
        exchange.transfer_asset(self.wrapped_native, self.identity, pool, amount)
    }

    /// Unwrap route proceeds held by the router and pay them to `to`
    fn release_native(&self, exchange: &mut Exchange, to: Address, amount: U256) -> Result<()> {
        exchange.unwrap_native(self.identity, amount)?;
        exchange.send_native(self.identity, to, amount)
    }

    fn ensure_native_first(&self, path: &[Address]) -> Result<()> {
        if path.first() != Some(&self.wrapped_native) {
            return Err(AmmError::InvalidPath);
        }
        Ok(())
    }

    fn ensure_native_last(&self, path: &[Address]) -> Result<()> {
        if path.last() != Some(&self.wrapped_native) {
            return Err(AmmError::InvalidPath);
        }
        Ok(())
    }

    fn receipt(&self, exchange: &mut Exchange, kind: SwapKind, amounts: &[U256]) {
        let amount_in = amounts.first().copied().unwrap_or_default();
        let amount_out = final_amount(amounts);
        info!(
            ?kind,
            amount_in = %amount_in,
            amount_out = %amount_out,
            hops = amounts.len().saturating_sub(1),
            "swap routed"
        );
        exchange.emit(Event::Swapped {
            kind,
            amount_in,
            amount_out,
        });
    }
}

fn final_amount(amounts: &[U256]) -> U256 {
    amounts.last().copied().unwrap_or_default()
}
