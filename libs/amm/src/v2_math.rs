//! Constant-product AMM math with exact integer calculations
//!
//! Every formula truncates toward zero exactly like the on-chain reference
//! implementation, so quotes computed here match what a pool will accept
//! to the unit. Intermediate products use checked 256-bit arithmetic.

use types::{arith, AmmError, Address, Result, U256};

/// Fee-adjusted input multiplier (0.3% fee)
pub const FEE_NUMERATOR: u64 = 997;
/// Denominator paired with [`FEE_NUMERATOR`]
pub const FEE_DENOMINATOR: u64 = 1000;

/// Constant-product math functions
pub struct V2Math;

impl V2Math {
    /// Order two asset identities canonically (lower identity first)
    pub fn sort_tokens(asset_a: Address, asset_b: Address) -> Result<(Address, Address)> {
        if asset_a == asset_b {
            return Err(AmmError::IdenticalAddresses);
        }
        let (low, high) = if asset_a < asset_b {
            (asset_a, asset_b)
        } else {
            (asset_b, asset_a)
        };
        if low.is_zero() {
            return Err(AmmError::ZeroAddress);
        }
        Ok((low, high))
    }

    /// Amount of B equivalent to `amount_a` of A at the current reserve ratio
    ///
    /// `amount_b = amount_a * reserve_b / reserve_a`, truncating.
    pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256> {
        if amount_a.is_zero() || reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(AmmError::InvalidInput);
        }
        arith::div(arith::mul(amount_a, reserve_b)?, reserve_a)
    }

    /// Maximum output for an exact input, after the 0.3% fee
    ///
    /// # Arguments
    /// * `amount_in` - Input asset amount
    /// * `reserve_in` - Input asset reserve
    /// * `reserve_out` - Output asset reserve
    ///
    /// # Returns
    /// `amount_in*997*reserve_out / (reserve_in*1000 + amount_in*997)`
    pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
        if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InvalidInput);
        }

        let amount_in_with_fee = arith::mul(amount_in, U256::from(FEE_NUMERATOR))?;
        let numerator = arith::mul(amount_in_with_fee, reserve_out)?;
        let denominator = arith::add(
            arith::mul(reserve_in, U256::from(FEE_DENOMINATOR))?,
            amount_in_with_fee,
        )?;

        arith::div(numerator, denominator)
    }

    /// Minimum input required for an exact output (reverse calculation)
    ///
    /// Adds one unit after the truncating division so the caller never
    /// under-pays.
    pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
        if amount_out.is_zero() {
            return Err(AmmError::InvalidInput);
        }
        if reserve_in.is_zero() || amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }

        let numerator = arith::mul(
            arith::mul(reserve_in, amount_out)?,
            U256::from(FEE_DENOMINATOR),
        )?;
        let denominator = arith::mul(reserve_out - amount_out, U256::from(FEE_NUMERATOR))?;

        arith::add(arith::div(numerator, denominator)?, U256::one())
    }

    /// Integer square root (Babylonian method). Returns floor(√y).
    pub fn sqrt(y: U256) -> U256 {
        if y > U256::from(3) {
            let mut z = y;
            let mut x = y / 2 + 1;
            while x < z {
                z = x;
                x = (y / x + x) / 2;
            }
            z
        } else if !y.is_zero() {
            U256::one()
        } else {
            U256::zero()
        }
    }
}
