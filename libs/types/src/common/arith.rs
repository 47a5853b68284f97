//! Checked 256-bit arithmetic
//!
//! `U256` operators panic on overflow. Exchange code goes through these
//! helpers instead so overflow becomes an [`AmmError`] that aborts the call.

use crate::{AmmError, Result};
use ethers_core::types::U256;

#[inline]
pub fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(AmmError::ArithmeticOverflow)
}

#[inline]
pub fn sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b).ok_or(AmmError::ArithmeticUnderflow)
}

#[inline]
pub fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(AmmError::ArithmeticOverflow)
}

/// Truncating division; dividing by zero is reported as invalid input
#[inline]
pub fn div(a: U256, b: U256) -> Result<U256> {
    a.checked_div(b).ok_or(AmmError::InvalidInput)
}
