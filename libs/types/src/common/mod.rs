//! Common building blocks shared by every exchange crate

pub mod arith;
pub mod errors;
pub mod identifiers;
