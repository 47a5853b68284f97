//! # Exchange Router
//!
//! Stateless orchestration over the pools held by a [`pool::Exchange`]:
//! optimal two-sided deposits, withdrawals (optionally authorized by a signed
//! permit), and exact-input or exact-output trades along multi-hop paths,
//! with native value wrapped and unwrapped at the route boundaries.
//!
//! Every entry point checks its deadline against the exchange clock and runs
//! as one atomic call: a failure at any hop leaves no partial effect.
//!
//! ```text
//! caller ──approve──► Router identity
//!   Router::swap_exact_tokens_for_tokens
//!     ├─ get_amounts_out(path)           (amm, reads pool reserves)
//!     ├─ transfer_asset_from → pool[0]
//!     └─ swap pool[i] → pool[i+1] … → to (no custody between hops)
//! ```

mod liquidity;
mod router;
mod swaps;

pub use liquidity::{PermitApproval, WithdrawRequest};
pub use router::Router;
