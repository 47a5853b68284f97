//! Deterministic pool identity derivation
//!
//! A pool's identity is a pure function of the registry identity and the
//! canonically ordered asset pair, so it can be computed without reading any
//! registry state: `keccak256(0xff ++ registry ++ keccak256(asset0 ++ asset1)
//! ++ INIT_CODE_HASH)[12..]`.

use crate::V2Math;
use ethers_core::utils::{get_create2_address_from_hash, keccak256};
use types::{Address, Result};

/// Fixed code hash every pool identity is derived with
pub const INIT_CODE_HASH: [u8; 32] = [
    0x96, 0xe8, 0xac, 0x42, 0x77, 0x19, 0x8f, 0xf8, 0xb6, 0xf7, 0x85, 0x47, 0x8a, 0xa9, 0xa3,
    0x9f, 0x40, 0x3c, 0xb7, 0x68, 0xdd, 0x02, 0xcb, 0xee, 0x32, 0x6c, 0x3e, 0x7d, 0xa3, 0x48,
    0x84, 0x5f,
];

/// Identity of the pool for `(asset_a, asset_b)` under `registry`, in
/// either argument order.
pub fn pool_address(registry: Address, asset_a: Address, asset_b: Address) -> Result<Address> {
    let (asset0, asset1) = V2Math::sort_tokens(asset_a, asset_b)?;
    let mut packed = [0u8; 40];
    packed[..20].copy_from_slice(asset0.as_bytes());
    packed[20..].copy_from_slice(asset1.as_bytes());
    let salt = keccak256(packed);
    Ok(get_create2_address_from_hash(registry, salt, INIT_CODE_HASH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{label_address, AmmError};

    #[test]
    fn test_order_independent() {
        let registry = label_address("registry");
        let (a, b) = (label_address("a"), label_address("b"));
        assert_eq!(
            pool_address(registry, a, b).unwrap(),
            pool_address(registry, b, a).unwrap()
        );
    }

    #[test]
    fn test_depends_on_registry_and_pair() {
        let (a, b, c) = (label_address("a"), label_address("b"), label_address("c"));
        let first = pool_address(label_address("registry-1"), a, b).unwrap();
        assert_ne!(first, pool_address(label_address("registry-2"), a, b).unwrap());
        assert_ne!(first, pool_address(label_address("registry-1"), a, c).unwrap());
    }

    #[test]
    fn test_matches_reference_derivation() {
        // Reference factory and token pair from the canonical mainnet deployment
        let registry: Address = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f".parse().unwrap();
        let usdc: Address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap();
        let weth: Address = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".parse().unwrap();
        let expected: Address = "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc".parse().unwrap();
        assert_eq!(pool_address(registry, usdc, weth).unwrap(), expected);
    }

    #[test]
    fn test_rejects_identical_assets() {
        let a = label_address("a");
        assert_eq!(
            pool_address(label_address("registry"), a, a),
            Err(AmmError::IdenticalAddresses)
        );
    }
}
