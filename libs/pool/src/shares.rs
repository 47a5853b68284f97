//! Liquidity share ledger with signed approvals
//!
//! Each pool owns one [`ShareLedger`]. Besides plain transfers and
//! allowances it accepts an EIP-712 `Permit` signed by the owner, which sets
//! an allowance without the owner submitting anything themselves.

use crate::{Exchange, TokenLedger};
use ethers_core::abi::{encode, Token};
use ethers_core::utils::keccak256;
use exchange_config::protocol::{permit, shares};
use std::collections::HashMap;
use tracing::debug;
use types::{arith, AmmError, Address, Event, Result, Signature, Timestamp, H256, U256};

/// Fungible ledger of one pool's liquidity shares
#[derive(Debug, Clone)]
pub struct ShareLedger {
    name: String,
    symbol: String,
    ledger: TokenLedger,
    nonces: HashMap<Address, U256>,
    domain_separator: H256,
}

impl ShareLedger {
    /// Ledger for the pool at `pool`; the domain binds `chain_id` and the pool identity
    pub fn new(name: &str, symbol: &str, chain_id: u64, pool: Address) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            ledger: TokenLedger::default(),
            nonces: HashMap::new(),
            domain_separator: domain_separator(name, chain_id, pool),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        shares::DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.ledger.balance_of(holder)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    pub fn nonce(&self, owner: &Address) -> U256 {
        self.nonces.get(owner).copied().unwrap_or_default()
    }

    pub fn domain_separator(&self) -> H256 {
        self.domain_separator
    }

    /// Digest an owner signs to authorize `spender` for `value` shares
    pub fn permit_digest(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        nonce: U256,
        deadline: Timestamp,
    ) -> H256 {
        let struct_hash = keccak256(encode(&[
            Token::FixedBytes(keccak256(permit::PERMIT_TYPE).to_vec()),
            Token::Address(owner),
            Token::Address(spender),
            Token::Uint(value),
            Token::Uint(nonce),
            Token::Uint(U256::from(deadline)),
        ]));

        let mut preimage = Vec::with_capacity(66);
        preimage.extend_from_slice(&permit::DIGEST_PREFIX);
        preimage.extend_from_slice(self.domain_separator.as_bytes());
        preimage.extend_from_slice(&struct_hash);
        H256::from(keccak256(preimage))
    }

    /// Set `owner`'s allowance for `spender` from a signed permit.
    ///
    /// The signature must cover the owner's current nonce, which is consumed
    /// on success so the same signature can never be replayed.
    pub fn permit(
        &mut self,
        now: Timestamp,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: Timestamp,
        signature: &Signature,
    ) -> Result<()> {
        if deadline < now {
            return Err(AmmError::Expired);
        }

        let nonce = self.nonce(&owner);
        let digest = self.permit_digest(owner, spender, value, nonce, deadline);
        let recovered = signature
            .recover(digest)
            .map_err(|_| AmmError::InvalidSignature)?;
        if recovered.is_zero() || recovered != owner {
            return Err(AmmError::InvalidSignature);
        }

        self.nonces.insert(owner, arith::add(nonce, U256::one())?);
        self.ledger.approve(owner, spender, value);
        Ok(())
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut TokenLedger {
        &mut self.ledger
    }
}

fn domain_separator(name: &str, chain_id: u64, verifying_contract: Address) -> H256 {
    H256::from(keccak256(encode(&[
        Token::FixedBytes(keccak256(permit::DOMAIN_TYPE).to_vec()),
        Token::FixedBytes(keccak256(name).to_vec()),
        Token::FixedBytes(keccak256(permit::DOMAIN_VERSION).to_vec()),
        Token::Uint(U256::from(chain_id)),
        Token::Address(verifying_contract),
    ])))
}

// Share operations addressed by pool identity
impl Exchange {
    pub fn shares(&self, pool: Address) -> Result<&ShareLedger> {
        Ok(&self.pool(pool)?.shares)
    }

    pub fn share_balance(&self, pool: Address, holder: Address) -> Result<U256> {
        Ok(self.shares(pool)?.balance_of(&holder))
    }

    pub fn total_shares(&self, pool: Address) -> Result<U256> {
        Ok(self.shares(pool)?.total_supply())
    }

    pub fn share_allowance(&self, pool: Address, owner: Address, spender: Address) -> Result<U256> {
        Ok(self.shares(pool)?.allowance(&owner, &spender))
    }

    pub fn share_nonce(&self, pool: Address, owner: Address) -> Result<U256> {
        Ok(self.shares(pool)?.nonce(&owner))
    }

    pub fn transfer_shares(
        &mut self,
        pool: Address,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.pool_mut(pool)?
            .shares
            .ledger_mut()
            .transfer(caller, to, amount)?;
        self.emit(Event::Transfer {
            token: pool,
            from: caller,
            to,
            amount,
        });
        Ok(())
    }

    pub fn approve_shares(
        &mut self,
        pool: Address,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        self.pool_mut(pool)?
            .shares
            .ledger_mut()
            .approve(caller, spender, amount);
        self.emit(Event::Approval {
            token: pool,
            owner: caller,
            spender,
            amount,
        });
        Ok(())
    }

    pub fn transfer_shares_from(
        &mut self,
        pool: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.pool_mut(pool)?
            .shares
            .ledger_mut()
            .transfer_from(spender, from, to, amount)?;
        self.emit(Event::Transfer {
            token: pool,
            from,
            to,
            amount,
        });
        Ok(())
    }

    /// Apply a signed permit against the current clock
    pub fn permit_shares(
        &mut self,
        pool: Address,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: Timestamp,
        signature: &Signature,
    ) -> Result<()> {
        let now = self.now;
        self.pool_mut(pool)?
            .shares
            .permit(now, owner, spender, value, deadline, signature)?;
        debug!(pool = ?pool, owner = ?owner, spender = ?spender, "permit accepted");
        self.emit(Event::Approval {
            token: pool,
            owner,
            spender,
            amount: value,
        });
        Ok(())
    }

    pub(crate) fn mint_shares(&mut self, pool: Address, to: Address, amount: U256) -> Result<()> {
        self.pool_mut(pool)?.shares.ledger_mut().mint(to, amount)?;
        self.emit(Event::Transfer {
            token: pool,
            from: Address::zero(),
            to,
            amount,
        });
        Ok(())
    }

    pub(crate) fn burn_shares(&mut self, pool: Address, from: Address, amount: U256) -> Result<()> {
        self.pool_mut(pool)?.shares.ledger_mut().burn(from, amount)?;
        self.emit(Event::Transfer {
            token: pool,
            from,
            to: Address::zero(),
            amount,
        });
        Ok(())
    }
}
