//! UQ112x112 fixed point and time-weighted price helpers
//!
//! Pools accumulate `price * elapsed_seconds` in UQ112x112 into 256-bit
//! counters that wrap on overflow. The 32-bit timestamps wrap as well. Both
//! are differenced with wrapping subtraction, which yields the right answer
//! as long as less than one full wrap happened between observations.

use types::{AmmError, Result, U256};

/// Fractional bits of the UQ112x112 format
pub const RESOLUTION: usize = 112;

/// Largest value a reserve may hold (2^112 - 1)
pub fn max_reserve() -> U256 {
    (U256::one() << RESOLUTION) - 1
}

/// Encode a 112-bit integer as UQ112x112
#[inline]
pub fn encode(y: U256) -> U256 {
    y << RESOLUTION
}

/// Divide a UQ112x112 by an integer, returning UQ112x112
#[inline]
pub fn uq_div(x: U256, y: U256) -> Result<U256> {
    x.checked_div(y).ok_or(AmmError::InvalidInput)
}

/// Price of the `this` side in units of the `other` side, scaled by elapsed
/// seconds. Callers add the result to a wrapping accumulator.
pub fn price_increment(other_reserve: U256, this_reserve: U256, elapsed: u32) -> Result<U256> {
    let price = uq_div(encode(other_reserve), this_reserve)?;
    Ok(price.overflowing_mul(U256::from(elapsed)).0)
}

/// Time-weighted average price between two accumulator observations.
///
/// Returns a UQ112x112 value. Fails with `InvalidInput` when no time elapsed.
pub fn average_price(
    cumulative_start: U256,
    cumulative_end: U256,
    timestamp_start: u32,
    timestamp_end: u32,
) -> Result<U256> {
    let elapsed = timestamp_end.wrapping_sub(timestamp_start);
    if elapsed == 0 {
        return Err(AmmError::InvalidInput);
    }
    let (delta, _) = cumulative_end.overflowing_sub(cumulative_start);
    Ok(delta / U256::from(elapsed))
}

/// Apply a UQ112x112 price to an amount, truncating to an integer
pub fn consult(price: U256, amount: U256) -> Result<U256> {
    let scaled = price
        .checked_mul(amount)
        .ok_or(AmmError::ArithmeticOverflow)?;
    Ok(scaled >> RESOLUTION)
}
