//! Exchange event log entries
//!
//! Every state transition appends events to the exchange log in the order the
//! original call produced them. A rolled-back call leaves no events behind.

use ethers_core::types::{Address, U256};
use serde::Serialize;

/// Router entry point that produced a [`Event::Swapped`] receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapKind {
    ExactTokensForTokens,
    TokensForExactTokens,
    ExactNativeForTokens,
    TokensForExactNative,
    ExactTokensForNative,
    NativeForExactTokens,
}

/// Events emitted by the registry, pools, ledgers, native wrapper and router
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum Event {
    /// Registry created a pool; `count` is the enumeration length afterwards
    PoolCreated {
        asset0: Address,
        asset1: Address,
        pool: Address,
        count: u64,
    },
    Mint {
        pool: Address,
        sender: Address,
        amount0: U256,
        amount1: U256,
    },
    Burn {
        pool: Address,
        sender: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
    },
    Swap {
        pool: Address,
        sender: Address,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    },
    /// Reserves after every reserve update
    Sync {
        pool: Address,
        reserve0: U256,
        reserve1: U256,
    },
    /// Movement on a share ledger (`token` is the pool) or a traded asset.
    /// Mints come from the null identity, burns go to it.
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    Approval {
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    },
    /// Native value wrapped
    Deposit { holder: Address, amount: U256 },
    /// Native value unwrapped
    Withdrawal { holder: Address, amount: U256 },
    LiquidityAdded {
        amount_a: U256,
        amount_b: U256,
        shares: U256,
    },
    NativeLiquidityAdded {
        amount_token: U256,
        amount_native: U256,
        shares: U256,
    },
    LiquidityRemoved { amount_a: U256, amount_b: U256 },
    NativeLiquidityRemoved {
        amount_token: U256,
        amount_native: U256,
    },
    Swapped {
        kind: SwapKind,
        amount_in: U256,
        amount_out: U256,
    },
}
