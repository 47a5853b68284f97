//! Optimal deposit sizing for liquidity provision
//!
//! Given what a provider is willing to deposit on each side and the minimum
//! they will accept, picks the largest pair of amounts that matches the pool's
//! current reserve ratio.

use crate::V2Math;
use serde::{Deserialize, Serialize};
use types::{AmmError, Result, U256};

/// Desired and minimum amounts for a two-sided deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
}

impl DepositRequest {
    pub fn new(
        amount_a_desired: U256,
        amount_b_desired: U256,
        amount_a_min: U256,
        amount_b_min: U256,
    ) -> Self {
        Self {
            amount_a_desired,
            amount_b_desired,
            amount_a_min,
            amount_b_min,
        }
    }

    /// Amounts to deposit against `(reserve_a, reserve_b)`.
    ///
    /// An empty pool takes the desired amounts as-is and sets the price.
    /// Otherwise B is quoted for all of A first; if that exceeds what the
    /// provider offered for B, A is quoted for all of B instead.
    pub fn optimal_amounts(&self, reserve_a: U256, reserve_b: U256) -> Result<(U256, U256)> {
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok((self.amount_a_desired, self.amount_b_desired));
        }

        let amount_b_optimal = V2Math::quote(self.amount_a_desired, reserve_a, reserve_b)?;
        if amount_b_optimal <= self.amount_b_desired {
            if amount_b_optimal < self.amount_b_min {
                return Err(AmmError::InsufficientBAmount);
            }
            return Ok((self.amount_a_desired, amount_b_optimal));
        }

        let amount_a_optimal = V2Math::quote(self.amount_b_desired, reserve_b, reserve_a)?;
        // Quoting B for all of A overshot, so A for all of B cannot exceed A desired
        debug_assert!(amount_a_optimal <= self.amount_a_desired);
        if amount_a_optimal < self.amount_a_min {
            return Err(AmmError::InsufficientAAmount);
        }
        Ok((amount_a_optimal, self.amount_b_desired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(a: u64, b: u64, a_min: u64, b_min: u64) -> DepositRequest {
        DepositRequest::new(U256::from(a), U256::from(b), U256::from(a_min), U256::from(b_min))
    }

    #[test]
    fn test_empty_pool_takes_desired_amounts() {
        let amounts = request(2_000, 3_000, 0, 0)
            .optimal_amounts(U256::zero(), U256::zero())
            .unwrap();
        assert_eq!(amounts, (U256::from(2_000), U256::from(3_000)));
    }

    #[test]
    fn test_b_side_binds_when_quote_fits() {
        // 1:2 pool, offering 100 A and 500 B -> 100 A, 200 B
        let amounts = request(100, 500, 0, 0)
            .optimal_amounts(U256::from(1_000), U256::from(2_000))
            .unwrap();
        assert_eq!(amounts, (U256::from(100), U256::from(200)));
    }

    #[test]
    fn test_a_side_used_when_b_quote_overshoots() {
        // 1:2 pool, offering 400 A and 200 B -> 100 A, 200 B
        let amounts = request(400, 200, 0, 0)
            .optimal_amounts(U256::from(1_000), U256::from(2_000))
            .unwrap();
        assert_eq!(amounts, (U256::from(100), U256::from(200)));
    }

    #[test]
    fn test_minimums_are_enforced() {
        assert_eq!(
            request(100, 500, 0, 201).optimal_amounts(U256::from(1_000), U256::from(2_000)),
            Err(AmmError::InsufficientBAmount)
        );
        assert_eq!(
            request(400, 200, 101, 0).optimal_amounts(U256::from(1_000), U256::from(2_000)),
            Err(AmmError::InsufficientAAmount)
        );
    }
}
