//! Default values for exchange configuration
//!
//! Well-known identities are derived from fixed labels so every process
//! computes the same pool identities without coordination.

/// Chain defaults
pub mod chain {
    pub const DEFAULT_CHAIN_ID: u64 = 1;
    pub const DEFAULT_GENESIS_TIMESTAMP: u64 = 1_700_000_000;
}

/// Label-derived identities
pub mod identities {
    pub const REGISTRY_LABEL: &str = "torq/amm/registry";
    pub const CONTROLLER_LABEL: &str = "torq/amm/fee-controller";
    pub const WRAPPED_NATIVE_LABEL: &str = "torq/amm/wrapped-native";
    pub const ROUTER_LABEL: &str = "torq/amm/router";
}

/// Logging defaults
pub mod logging {
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}
