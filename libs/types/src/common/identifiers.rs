//! Identity helpers
//!
//! Participants, assets, pools and the registry are all 20-byte identities.
//! The null identity is reserved: it receives the permanently locked minimum
//! liquidity and can never spend.

use ethers_core::types::Address;
use ethers_core::utils::keccak256;

/// Seconds since the epoch, as supplied by the exchange clock
pub type Timestamp = u64;

/// Derive a stable identity from a human-readable label.
///
/// Used for well-known identities (registry, wrapped native asset) and for
/// fixtures; the same label always yields the same identity.
pub fn label_address(label: &str) -> Address {
    Address::from_slice(&keccak256(label.as_bytes())[12..])
}

/// 32-bit block timestamp. Wraps by design; consumers difference with
/// `wrapping_sub`.
#[inline]
pub fn block_timestamp(now: Timestamp) -> u32 {
    (now % (1u64 << 32)) as u32
}
