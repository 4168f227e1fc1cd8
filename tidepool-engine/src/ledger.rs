use std::collections::HashMap;

use anchor_lang::prelude::*;
use fix::prelude::*;

use tidepool_core::amount::{unlimited, Amount};
use tidepool_core::error::CoreError::{
  AmountOverflow, AuthorizationFailed, InsufficientBalance,
};

use crate::state::EngineState;

/// One fungible ledger: balances, allowances, and permit nonces keyed by
/// holder. The same shape backs every asset and every pool's claim token.
#[derive(Debug)]
pub struct LedgerState {
  pub(crate) supply: Amount,
  pub(crate) balances: HashMap<Pubkey, Amount>,
  pub(crate) allowances: HashMap<(Pubkey, Pubkey), Amount>,
  pub(crate) nonces: HashMap<Pubkey, u64>,
}

impl Default for LedgerState {
  fn default() -> Self {
    LedgerState {
      supply: Amount::zero(),
      balances: HashMap::new(),
      allowances: HashMap::new(),
      nonces: HashMap::new(),
    }
  }
}

impl EngineState {
  /// Moves `amount` between two holders of the same ledger.
  pub(crate) fn ledger_transfer(
    &mut self,
    ledger: Pubkey,
    from: Pubkey,
    to: Pubkey,
    amount: Amount,
  ) -> Result<()> {
    let debited = self
      .balance_of(ledger, from)
      .checked_sub(&amount)
      .ok_or(InsufficientBalance)?;
    self.set_balance(ledger, from, debited);
    // Re-read so a self-transfer credits the freshly debited balance.
    let credited = self
      .balance_of(ledger, to)
      .checked_add(&amount)
      .ok_or(AmountOverflow)?;
    self.set_balance(ledger, to, credited);
    Ok(())
  }

  /// Spends `owner`'s allowance toward `spender`, then transfers. The
  /// unlimited sentinel is honored without being drawn down.
  pub(crate) fn ledger_transfer_from(
    &mut self,
    ledger: Pubkey,
    spender: Pubkey,
    owner: Pubkey,
    to: Pubkey,
    amount: Amount,
  ) -> Result<()> {
    let approved = self.allowance(ledger, owner, spender);
    if approved < amount {
      return Err(AuthorizationFailed.into());
    }
    if approved != unlimited() {
      let remaining =
        approved.checked_sub(&amount).ok_or(AuthorizationFailed)?;
      self.set_allowance(ledger, owner, spender, remaining);
    }
    self.ledger_transfer(ledger, owner, to, amount)
  }

  pub(crate) fn ledger_approve(
    &mut self,
    ledger: Pubkey,
    owner: Pubkey,
    spender: Pubkey,
    value: Amount,
  ) {
    self.set_allowance(ledger, owner, spender, value);
  }

  /// Creates `amount` new units credited to `to`.
  pub(crate) fn ledger_mint(
    &mut self,
    ledger: Pubkey,
    to: Pubkey,
    amount: Amount,
  ) -> Result<()> {
    let supply = self
      .supply_of(ledger)
      .checked_add(&amount)
      .ok_or(AmountOverflow)?;
    self.set_supply(ledger, supply);
    let credited = self
      .balance_of(ledger, to)
      .checked_add(&amount)
      .ok_or(AmountOverflow)?;
    self.set_balance(ledger, to, credited);
    Ok(())
  }

  /// Destroys `amount` units held by `from`.
  pub(crate) fn ledger_burn(
    &mut self,
    ledger: Pubkey,
    from: Pubkey,
    amount: Amount,
  ) -> Result<()> {
    let debited = self
      .balance_of(ledger, from)
      .checked_sub(&amount)
      .ok_or(InsufficientBalance)?;
    self.set_balance(ledger, from, debited);
    let supply = self
      .supply_of(ledger)
      .checked_sub(&amount)
      .ok_or(AmountOverflow)?;
    self.set_supply(ledger, supply);
    Ok(())
  }
}
