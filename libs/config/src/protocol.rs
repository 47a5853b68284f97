//! Protocol constants
//!
//! Values every pool and ledger agrees on. Changing any of them changes pool
//! economics or invalidates outstanding permit signatures.

/// Shares minted to the null identity on the first deposit and never spendable
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Protocol fee takes 1/(PROTOCOL_FEE_ROOT_K_WEIGHT + 1) of √k growth
pub const PROTOCOL_FEE_ROOT_K_WEIGHT: u64 = 5;

/// Fee-adjusted invariant scale: balances are multiplied by this before the
/// 3-unit fee is deducted from the paid-in side
pub const INVARIANT_SCALE: u64 = 1_000;

/// Fee deducted per `INVARIANT_SCALE` units of input
pub const INVARIANT_FEE: u64 = 3;

/// Share ledger metadata
pub mod shares {
    pub const DECIMALS: u8 = 18;
    pub const DEFAULT_NAME: &str = "Torq Constant Product";
    pub const DEFAULT_SYMBOL: &str = "TCP-LP";
}

/// Typed structured-data signing (permit) constants
pub mod permit {
    pub const DOMAIN_TYPE: &str =
        "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
    pub const PERMIT_TYPE: &str =
        "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";
    pub const DOMAIN_VERSION: &str = "1";
    /// Prefix of the final digest preimage
    pub const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];
}
