//! Reserve lookup trait and multi-hop amount propagation
//!
//! Path quoting only needs read access to pool reserves, so it is expressed
//! against [`ReserveSource`] and stays independent of how pools are stored.

use crate::V2Math;
use tracing::debug;
use types::{AmmError, Address, Result, U256};

/// Read access to pool reserves by asset pair
pub trait ReserveSource {
    /// Reserves of the pool for `(asset_a, asset_b)`, ordered as requested.
    ///
    /// Returns `(0, 0)` when no pool exists for the pair.
    fn reserves_for(&self, asset_a: Address, asset_b: Address) -> Result<(U256, U256)>;
}

/// Reserves of one hop, failing when the pool is missing or drained
fn hop_reserves<S: ReserveSource + ?Sized>(
    source: &S,
    asset_in: Address,
    asset_out: Address,
) -> Result<(U256, U256)> {
    let (reserve_in, reserve_out) = source.reserves_for(asset_in, asset_out)?;
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok((reserve_in, reserve_out))
}

/// Amounts along `path` for an exact input.
///
/// The result has one entry per path element: the first is `amount_in`, the
/// last is the final output. Any failing hop aborts the whole computation.
pub fn get_amounts_out<S: ReserveSource + ?Sized>(
    source: &S,
    amount_in: U256,
    path: &[Address],
) -> Result<Vec<U256>> {
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }

    let mut amounts = Vec::with_capacity(path.len());
    amounts.push(amount_in);
    for hop in path.windows(2) {
        let (reserve_in, reserve_out) = hop_reserves(source, hop[0], hop[1])?;
        let previous = amounts[amounts.len() - 1];
        amounts.push(V2Math::get_amount_out(previous, reserve_in, reserve_out)?);
    }

    debug!(hops = path.len() - 1, amount_in = %amount_in, "quoted exact-input path");
    Ok(amounts)
}

/// Amounts along `path` for an exact output, propagated backward from the
/// last hop. The first entry is the required input.
pub fn get_amounts_in<S: ReserveSource + ?Sized>(
    source: &S,
    amount_out: U256,
    path: &[Address],
) -> Result<Vec<U256>> {
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }

    let mut amounts = vec![U256::zero(); path.len()];
    let last = path.len() - 1;
    amounts[last] = amount_out;
    for i in (1..path.len()).rev() {
        let (reserve_in, reserve_out) = hop_reserves(source, path[i - 1], path[i])?;
        amounts[i - 1] = V2Math::get_amount_in(amounts[i], reserve_in, reserve_out)?;
    }

    debug!(hops = last, amount_out = %amount_out, "quoted exact-output path");
    Ok(amounts)
}
