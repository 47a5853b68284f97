//! Error taxonomy for the exchange
//!
//! Every failure aborts the whole call; nothing is retried internally. The
//! variants mirror the reasons a caller has to adjust parameters and resubmit.

use ethers_core::types::Address;
use thiserror::Error;

/// Errors raised by the math library, registry, ledgers, pools and router
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// Malformed arguments to a pure math function
    #[error("invalid input")]
    InvalidInput,

    /// A pool lacks the reserves required for the requested operation
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Deposit too small to mint any shares
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    /// Withdrawal too small to return both assets
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    /// Swap was not paid for on either side
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    /// Exact-input swap would return less than the caller's minimum
    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    /// Slippage bound violated on the A side
    #[error("insufficient A amount")]
    InsufficientAAmount,

    /// Slippage bound violated on the B side
    #[error("insufficient B amount")]
    InsufficientBAmount,

    /// Exact-output swap would cost more than the caller's maximum
    #[error("excessive input amount")]
    ExcessiveInputAmount,

    /// Path too short, or the native-asset boundary is not the wrapped native asset
    #[error("invalid path")]
    InvalidPath,

    /// Swap output addressed to one of the pool's own assets
    #[error("invalid to")]
    InvalidTo,

    /// Fee-adjusted constant product decreased
    #[error("K")]
    K,

    /// Reentrant call into a pool that is mid-operation
    #[error("locked")]
    Locked,

    /// Deadline or permit expiry has passed
    #[error("expired")]
    Expired,

    /// Permit signature does not recover to the owner
    #[error("invalid signature")]
    InvalidSignature,

    /// Caller is not allowed to perform an administrative action
    #[error("forbidden")]
    Forbidden,

    #[error("identical addresses")]
    IdenticalAddresses,

    #[error("zero address")]
    ZeroAddress,

    #[error("pair exists")]
    PairExists,

    /// Reserve does not fit the 112-bit storage width
    #[error("overflow")]
    Overflow,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    /// Asset movement rejected by the asset ledger
    #[error("transfer of asset {asset:?} failed")]
    TransferFailed { asset: Address },

    /// Native value movement rejected (insufficient native balance)
    #[error("native transfer failed")]
    NativeTransferFailed,

    #[error("pool {0:?} not found")]
    PoolNotFound(Address),
}
