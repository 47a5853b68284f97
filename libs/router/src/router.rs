use amm::{get_amounts_in, get_amounts_out, pool_address, V2Math};
use exchange_config::ExchangeConfig;
use pool::Exchange;
use types::{AmmError, Address, Result, Timestamp, U256};

/// Router bound to its own identity and the wrapped native asset.
///
/// The router holds no state. Callers approve its identity on the assets
/// and share ledgers it should pull from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    pub(crate) identity: Address,
    pub(crate) wrapped_native: Address,
}

impl Router {
    pub fn new(identity: Address, wrapped_native: Address) -> Self {
        Self {
            identity,
            wrapped_native,
        }
    }

    pub fn from_config(config: &ExchangeConfig) -> Self {
        Self::new(config.router.identity, config.native.wrapped_identity)
    }

    pub fn identity(&self) -> Address {
        self.identity
    }

    pub fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    pub fn quote(&self, amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256> {
        V2Math::quote(amount_a, reserve_a, reserve_b)
    }

    pub fn get_amount_out(
        &self,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256> {
        V2Math::get_amount_out(amount_in, reserve_in, reserve_out)
    }

    pub fn get_amount_in(
        &self,
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256> {
        V2Math::get_amount_in(amount_out, reserve_in, reserve_out)
    }

    pub fn get_amounts_out(
        &self,
        exchange: &Exchange,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        get_amounts_out(exchange, amount_in, path)
    }

    pub fn get_amounts_in(
        &self,
        exchange: &Exchange,
        amount_out: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        get_amounts_in(exchange, amount_out, path)
    }

    /// Fail with `Expired` once the exchange clock has passed `deadline`
    pub(crate) fn ensure(&self, exchange: &Exchange, deadline: Timestamp) -> Result<()> {
        if deadline < exchange.now() {
            return Err(AmmError::Expired);
        }
        Ok(())
    }

    /// Pool identity for a pair, derived without consulting the registry
    pub(crate) fn pool_for(
        &self,
        exchange: &Exchange,
        asset_a: Address,
        asset_b: Address,
    ) -> Result<Address> {
        pool_address(exchange.registry().identity(), asset_a, asset_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::label_address;

    #[test]
    fn test_deadline_is_inclusive() {
        let exchange = Exchange::default();
        let router = Router::from_config(&ExchangeConfig::default());
        let now = exchange.now();

        assert!(router.ensure(&exchange, now).is_ok());
        assert!(router.ensure(&exchange, now + 1).is_ok());
        assert_eq!(router.ensure(&exchange, now - 1), Err(AmmError::Expired));
    }

    #[test]
    fn test_from_config_uses_configured_identities() {
        let config = ExchangeConfig::default();
        let router = Router::from_config(&config);
        assert_eq!(router.identity(), config.router.identity);
        assert_eq!(router.wrapped_native(), config.native.wrapped_identity);
    }

    #[test]
    fn test_pool_for_matches_registry() {
        let mut exchange = Exchange::default();
        let router = Router::from_config(&ExchangeConfig::default());
        let (a, b) = (label_address("a"), label_address("b"));
        let created = exchange.create_pool(a, b).unwrap();

        assert_eq!(router.pool_for(&exchange, b, a).unwrap(), created);
    }

    #[test]
    fn test_pass_through_quotes() {
        let router = Router::from_config(&ExchangeConfig::default());
        let u = |v: u64| U256::from(v);
        assert_eq!(router.quote(u(1), u(100), u(200)).unwrap(), u(2));
        assert_eq!(router.get_amount_out(u(100), u(1000), u(2000)).unwrap(), u(181));
        assert_eq!(router.get_amount_in(u(181), u(1000), u(2000)).unwrap(), u(100));
    }
}
