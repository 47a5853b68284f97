//! # Constant-Product AMM Library - Exact Pool Mathematics
//!
//! ## Purpose
//!
//! Pure, stateless math for constant-product pools: canonical pair ordering,
//! proportional quotes, fee-adjusted output/input amounts, multi-hop path
//! propagation, optimal deposit sizing, UQ112x112 price accumulation and
//! deterministic pool identities.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool reserves through [`ReserveSource`], caller amounts
//! - **Output Destinations**: the pool state machine and the router
//! - **Precision**: 256-bit integers, truncating division, no floating-point
//! - **Validation**: checked arithmetic, typed [`types::AmmError`] failures
//!
//! ## Architecture Role
//!
//! ```text
//! Router ──► get_amounts_out / get_amounts_in ──► ReserveSource (pools)
//!   │                    │
//!   │                    └── V2Math::get_amount_out / get_amount_in
//!   └──► DepositRequest::optimal_amounts ──► V2Math::quote
//! Pool ──► V2Math::sqrt, fixed_point::price_increment
//! Registry ──► pool_address
//! ```

pub mod fixed_point;
pub mod optimal_size;
pub mod pool_address;
pub mod pool_traits;
pub mod v2_math;

pub use optimal_size::DepositRequest;
pub use pool_address::{pool_address, INIT_CODE_HASH};
pub use pool_traits::{get_amounts_in, get_amounts_out, ReserveSource};
pub use v2_math::{V2Math, FEE_DENOMINATOR, FEE_NUMERATOR};
