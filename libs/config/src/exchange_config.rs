//! Exchange Configuration Module
//!
//! Loads the settings an exchange instance is bootstrapped from: chain
//! identity for permit signatures, registry identities, share ledger metadata,
//! the wrapped native asset and the router. Supports a TOML base file, an
//! optional environment overlay file and `AMM_` prefixed environment variables
//! (`__` separates nesting, e.g. `AMM_CHAIN__CHAIN_ID=5`).

use crate::protocol::shares;
use crate::service::{chain, identities, logging};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use types::{label_address, Address, Timestamp};

/// Main exchange configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ExchangeConfig {
    pub chain: ChainConfig,
    pub registry: RegistryConfig,
    pub shares: ShareConfig,
    pub native: NativeConfig,
    pub router: RouterConfig,
    pub log_level: String,
}

/// Chain identity and clock origin
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    /// Bound into every permit domain separator
    pub chain_id: u64,
    /// Clock value the exchange starts at
    pub genesis_timestamp: Timestamp,
}

/// Registry identities
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry identity; every pool identity is derived from it
    pub identity: Address,
    /// Initial controller allowed to change the fee recipient
    pub controller: Address,
    /// Protocol fee recipient; `None` leaves the protocol fee off
    pub fee_recipient: Option<Address>,
}

/// Share ledger metadata (decimals are fixed)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ShareConfig {
    pub name: String,
    pub symbol: String,
}

/// Wrapped native asset
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NativeConfig {
    pub wrapped_identity: Address,
}

/// Router identity; callers approve it to pull their assets
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RouterConfig {
    pub identity: Address,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: chain::DEFAULT_CHAIN_ID,
            genesis_timestamp: chain::DEFAULT_GENESIS_TIMESTAMP,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            identity: label_address(identities::REGISTRY_LABEL),
            controller: label_address(identities::CONTROLLER_LABEL),
            fee_recipient: None,
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            name: shares::DEFAULT_NAME.to_string(),
            symbol: shares::DEFAULT_SYMBOL.to_string(),
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            wrapped_identity: label_address(identities::WRAPPED_NATIVE_LABEL),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            identity: label_address(identities::ROUTER_LABEL),
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            registry: RegistryConfig::default(),
            shares: ShareConfig::default(),
            native: NativeConfig::default(),
            router: RouterConfig::default(),
            log_level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from files with environment overrides
    ///
    /// The overlay for `environment` is looked up next to the base file as
    /// `environments/{environment}.toml`.
    pub fn load(base_path: &Path, environment: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from(base_path).required(true));

        if let Some(env) = environment {
            let env_file = base_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("AMM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document (no environment overrides)
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no exchange can run with
    pub fn validate(&self) -> Result<()> {
        if self.registry.identity.is_zero() {
            bail!("registry.identity must not be the null identity");
        }
        if self.registry.controller.is_zero() {
            bail!("registry.controller must not be the null identity");
        }
        if self.native.wrapped_identity.is_zero() {
            bail!("native.wrapped_identity must not be the null identity");
        }
        if self.router.identity.is_zero() {
            bail!("router.identity must not be the null identity");
        }
        if self.shares.name.is_empty() || self.shares.symbol.is_empty() {
            bail!("shares.name and shares.symbol must be set");
        }
        Ok(())
    }
}

/// Convenience function to load configuration from a file
pub fn load_config(path: &Path, environment: Option<&str>) -> Result<ExchangeConfig> {
    ExchangeConfig::load(path, environment)
}
