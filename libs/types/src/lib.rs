//! # Exchange Types
//!
//! Shared vocabulary for the constant-product exchange crates: identities,
//! amounts, the error taxonomy and the event log entries.
//!
//! ## Design Philosophy
//!
//! - **Integer Amounts Only**: all balances and reserves are 256-bit unsigned
//!   integers; there is no floating-point anywhere in the exchange
//! - **Checked Arithmetic**: overflow and underflow surface as typed errors
//!   through the helpers in [`common::arith`] instead of panicking
//! - **One Error Type**: every fallible operation in the workspace returns
//!   [`AmmError`], so failures propagate with `?` across crate boundaries
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{label_address, AmmError, Address};
//!
//! let alice: Address = label_address("alice");
//! assert_ne!(alice, Address::zero());
//! assert_eq!(AmmError::K.to_string(), "K");
//! ```

pub mod common;
pub mod events;

pub use common::arith;
pub use common::errors::AmmError;
pub use common::identifiers::{block_timestamp, label_address, Timestamp};
pub use events::{Event, SwapKind};

/// Identities and amounts are the Ethereum primitives so signatures,
/// hashing and ABI encoding interoperate with the wider tooling.
pub use ethers_core::types::{Address, Signature, H256, U256};

/// Workspace-wide result alias
pub type Result<T> = std::result::Result<T, AmmError>;
