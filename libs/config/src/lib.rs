//! # Exchange Centralized Configuration
//!
//! Centralized configuration, protocol constants and logging setup for the
//! exchange crates.
//!
//! ## Features
//!
//! - **Protocol Constants**: minimum liquidity, protocol fee weight, permit types
//! - **Exchange Configuration**: chain identity, registry identities, share metadata
//! - **Logging**: tracing subscriber installation honoring `RUST_LOG`
//!
//! ## Usage
//!
//! ```rust
//! use exchange_config::{protocol, ExchangeConfig};
//!
//! let config = ExchangeConfig::default();
//! assert_eq!(protocol::MINIMUM_LIQUIDITY, 1_000);
//! assert!(config.validate().is_ok());
//! ```

pub mod exchange_config;
pub mod logging;
pub mod protocol;
pub mod service;

// Re-export commonly used types
pub use exchange_config::{
    load_config, ChainConfig, ExchangeConfig, NativeConfig, RegistryConfig, RouterConfig,
    ShareConfig,
};
pub use logging::init_logging;
