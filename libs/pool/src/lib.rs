//! # Exchange Pool State
//!
//! ## Purpose
//!
//! In-memory state of a constant-product exchange: asset and native ledgers,
//! the pool registry, each pool's reserves, price accumulators and share
//! ledger, and the event log. All of it lives in one [`Exchange`] value.
//!
//! ## Integration Points
//!
//! - **Input**: callers push assets with [`Exchange::transfer_asset`] and
//!   invoke [`Exchange::mint`], [`Exchange::burn`] or [`Exchange::swap`]
//! - **Output**: updated ledgers plus [`types::Event`] entries
//! - **Configuration**: [`exchange_config::ExchangeConfig`]
//! - **Quoting**: [`Exchange`] implements [`amm::ReserveSource`]
//!
//! ## Failure Semantics
//!
//! Every state-changing entry point is all-or-nothing. A failed call returns
//! its [`types::AmmError`] and leaves ledgers, pools and the event log
//! exactly as they were.

pub mod assets;
pub mod exchange;
pub mod pool_state;
pub mod registry;
pub mod shares;

pub use assets::TokenLedger;
pub use exchange::Exchange;
pub use pool_state::{FlashSwap, FlashSwapCallee, Pool};
pub use registry::Registry;
pub use shares::ShareLedger;
