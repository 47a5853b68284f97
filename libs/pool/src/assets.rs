//! Fungible balance ledgers
//!
//! [`TokenLedger`] backs every traded asset, every pool's share ledger and the
//! native value balances. Each ledger operation validates all of its writes
//! before applying any of them, so a failed call leaves the ledger untouched.

use crate::Exchange;
use std::collections::HashMap;
use tracing::debug;
use types::{arith, AmmError, Address, Event, Result, U256};

/// Balances, allowances and total supply of one fungible asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLedger {
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl TokenLedger {
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Create `amount` out of nothing for `to`
    pub fn mint(&mut self, to: Address, amount: U256) -> Result<()> {
        let total_supply = arith::add(self.total_supply, amount)?;
        let balance = arith::add(self.balance_of(&to), amount)?;
        self.total_supply = total_supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    /// Destroy `amount` held by `from`
    pub fn burn(&mut self, from: Address, amount: U256) -> Result<()> {
        let balance = self.debited(&from, amount)?;
        let total_supply = arith::sub(self.total_supply, amount)?;
        self.balances.insert(from, balance);
        self.total_supply = total_supply;
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        let from_balance = self.debited(&from, amount)?;
        if from == to {
            return Ok(());
        }
        let to_balance = arith::add(self.balance_of(&to), amount)?;
        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Move `amount` from `from` on behalf of `spender`.
    ///
    /// An allowance of `U256::MAX` is infinite and never decremented.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let allowance = self.allowance(&from, &spender);
        let remaining = if allowance == U256::MAX {
            allowance
        } else {
            arith::sub(allowance, amount)?
        };
        self.transfer(from, to, amount)?;
        self.allowances.insert((from, spender), remaining);
        Ok(())
    }

    /// Balance of `from` after removing `amount`. The null identity holds
    /// the permanently locked shares and can never be debited.
    fn debited(&self, from: &Address, amount: U256) -> Result<U256> {
        if from.is_zero() {
            return Err(AmmError::Forbidden);
        }
        arith::sub(self.balance_of(from), amount)
    }
}

// Traded assets
impl Exchange {
    pub fn asset_balance(&self, asset: Address, holder: Address) -> U256 {
        self.assets
            .get(&asset)
            .map(|ledger| ledger.balance_of(&holder))
            .unwrap_or_default()
    }

    pub fn asset_total_supply(&self, asset: Address) -> U256 {
        self.assets
            .get(&asset)
            .map(TokenLedger::total_supply)
            .unwrap_or_default()
    }

    pub fn asset_allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
        self.assets
            .get(&asset)
            .map(|ledger| ledger.allowance(&owner, &spender))
            .unwrap_or_default()
    }

    /// Issue new units of `asset` to `to` (test and bootstrap faucet)
    pub fn mint_asset(&mut self, asset: Address, to: Address, amount: U256) -> Result<()> {
        self.assets.entry(asset).or_default().mint(to, amount)?;
        self.emit(Event::Transfer {
            token: asset,
            from: Address::zero(),
            to,
            amount,
        });
        Ok(())
    }

    pub fn transfer_asset(
        &mut self,
        asset: Address,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.move_asset(asset, caller, to, amount)
    }

    pub fn approve_asset(
        &mut self,
        asset: Address,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        self.assets
            .entry(asset)
            .or_default()
            .approve(caller, spender, amount);
        self.emit(Event::Approval {
            token: asset,
            owner: caller,
            spender,
            amount,
        });
        Ok(())
    }

    /// Spend `from`'s allowance to `spender`. Any ledger failure surfaces
    /// as `TransferFailed` for the asset.
    pub fn transfer_asset_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.assets
            .entry(asset)
            .or_default()
            .transfer_from(spender, from, to, amount)
            .map_err(|_| AmmError::TransferFailed { asset })?;
        self.emit(Event::Transfer {
            token: asset,
            from,
            to,
            amount,
        });
        Ok(())
    }

    pub(crate) fn move_asset(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.assets
            .entry(asset)
            .or_default()
            .transfer(from, to, amount)
            .map_err(|_| AmmError::TransferFailed { asset })?;
        self.emit(Event::Transfer {
            token: asset,
            from,
            to,
            amount,
        });
        Ok(())
    }
}

// Native value and its wrapped form
impl Exchange {
    pub fn native_balance(&self, holder: Address) -> U256 {
        self.native.balance_of(&holder)
    }

    /// Credit native value to `holder` (test and bootstrap faucet)
    pub fn fund_native(&mut self, holder: Address, amount: U256) -> Result<()> {
        self.native.mint(holder, amount)
    }

    pub fn send_native(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        self.native
            .transfer(from, to, amount)
            .map_err(|_| AmmError::NativeTransferFailed)?;
        debug!(from = ?from, to = ?to, amount = %amount, "native value sent");
        Ok(())
    }

    /// Lock native value in the wrapped asset and credit `caller` one wrapped
    /// unit per native unit
    pub fn wrap_native(&mut self, caller: Address, amount: U256) -> Result<()> {
        let wrapped = self.wrapped_native;
        self.atomic("wrap_native", |exchange| {
            exchange.send_native(caller, wrapped, amount)?;
            exchange
                .assets
                .entry(wrapped)
                .or_default()
                .mint(caller, amount)?;
            exchange.emit(Event::Deposit {
                holder: caller,
                amount,
            });
            Ok(())
        })
    }

    /// Burn wrapped units held by `caller` and release the native value
    pub fn unwrap_native(&mut self, caller: Address, amount: U256) -> Result<()> {
        let wrapped = self.wrapped_native;
        self.atomic("unwrap_native", |exchange| {
            exchange
                .assets
                .entry(wrapped)
                .or_default()
                .burn(caller, amount)
                .map_err(|_| AmmError::TransferFailed { asset: wrapped })?;
            exchange.send_native(wrapped, caller, amount)?;
            exchange.emit(Event::Withdrawal {
                holder: caller,
                amount,
            });
            Ok(())
        })
    }
}
