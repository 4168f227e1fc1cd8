use std::collections::HashMap;

use anchor_lang::prelude::*;
use fix::prelude::*;

use tidepool_core::amount::Amount;

use crate::events::Event;
use crate::journal::{Journal, Savepoint, Undo};
use crate::ledger::LedgerState;
use crate::pool::{Phase, PoolState};

/// The only shared mutable state in the system: fungible ledgers, pools, and
/// the settlement record log. Every write goes through a journaled setter so
/// the active operation can be unwound as one unit.
#[derive(Debug, Default)]
pub struct EngineState {
  pub(crate) ledgers: HashMap<Pubkey, LedgerState>,
  pub(crate) pools: HashMap<Pubkey, PoolState>,
  pub(crate) events: Vec<Event>,
  pub(crate) journal: Journal,
}

impl EngineState {
  #[must_use]
  pub fn balance_of(&self, ledger: Pubkey, holder: Pubkey) -> Amount {
    self
      .ledgers
      .get(&ledger)
      .and_then(|l| l.balances.get(&holder).copied())
      .unwrap_or_else(Amount::zero)
  }

  #[must_use]
  pub fn supply_of(&self, ledger: Pubkey) -> Amount {
    self
      .ledgers
      .get(&ledger)
      .map(|l| l.supply)
      .unwrap_or_else(Amount::zero)
  }

  #[must_use]
  pub fn allowance(
    &self,
    ledger: Pubkey,
    owner: Pubkey,
    spender: Pubkey,
  ) -> Amount {
    self
      .ledgers
      .get(&ledger)
      .and_then(|l| l.allowances.get(&(owner, spender)).copied())
      .unwrap_or_else(Amount::zero)
  }

  #[must_use]
  pub fn nonce(&self, ledger: Pubkey, owner: Pubkey) -> u64 {
    self
      .ledgers
      .get(&ledger)
      .and_then(|l| l.nonces.get(&owner).copied())
      .unwrap_or(0)
  }

  #[must_use]
  pub fn pool(&self, asset: &Pubkey) -> Option<&PoolState> {
    self.pools.get(asset)
  }

  #[must_use]
  pub fn pool_count(&self) -> u64 {
    self.pools.len() as u64
  }

  #[must_use]
  pub fn events(&self) -> &[Event] {
    &self.events
  }

  pub(crate) fn set_balance(
    &mut self,
    ledger: Pubkey,
    holder: Pubkey,
    value: Amount,
  ) {
    let entry = self.ledgers.entry(ledger).or_default();
    let prev = entry
      .balances
      .insert(holder, value)
      .unwrap_or_else(Amount::zero);
    self.journal.record(Undo::Balance {
      ledger,
      holder,
      prev,
    });
  }

  pub(crate) fn set_supply(&mut self, ledger: Pubkey, value: Amount) {
    let entry = self.ledgers.entry(ledger).or_default();
    let prev = entry.supply;
    entry.supply = value;
    self.journal.record(Undo::Supply { ledger, prev });
  }

  pub(crate) fn set_allowance(
    &mut self,
    ledger: Pubkey,
    owner: Pubkey,
    spender: Pubkey,
    value: Amount,
  ) {
    let entry = self.ledgers.entry(ledger).or_default();
    let prev = entry
      .allowances
      .insert((owner, spender), value)
      .unwrap_or_else(Amount::zero);
    self.journal.record(Undo::Allowance {
      ledger,
      owner,
      spender,
      prev,
    });
  }

  pub(crate) fn set_nonce(&mut self, ledger: Pubkey, owner: Pubkey, value: u64) {
    let entry = self.ledgers.entry(ledger).or_default();
    let prev = entry.nonces.insert(owner, value).unwrap_or(0);
    self.journal.record(Undo::Nonce {
      ledger,
      owner,
      prev,
    });
  }

  pub(crate) fn set_reserve(&mut self, asset: Pubkey, value: Amount) {
    if let Some(pool) = self.pools.get_mut(&asset) {
      let prev = pool.reserve;
      pool.reserve = value;
      self.journal.record(Undo::Reserve { asset, prev });
    }
  }

  pub(crate) fn set_phase(&mut self, asset: Pubkey, value: Phase) {
    if let Some(pool) = self.pools.get_mut(&asset) {
      let prev = pool.phase;
      pool.phase = value;
      self.journal.record(Undo::Phase { asset, prev });
    }
  }

  pub(crate) fn insert_pool(&mut self, asset: Pubkey, pool: PoolState) {
    self.pools.insert(asset, pool);
    self.journal.record(Undo::PoolCreated { asset });
  }

  pub(crate) fn push_event(&mut self, event: Event) {
    self.events.push(event);
    self.journal.record(Undo::Event);
  }

  /// Hands the accumulated settlement records to the host. Only meaningful
  /// between operations; the engine refuses to drain mid-operation.
  pub(crate) fn take_events(&mut self) -> Vec<Event> {
    std::mem::take(&mut self.events)
  }

  #[must_use]
  pub(crate) fn savepoint(&self) -> Savepoint {
    self.journal.savepoint()
  }

  /// Applies every undo recorded since the savepoint, newest first.
  pub(crate) fn rollback_to(&mut self, savepoint: Savepoint) {
    let undos = self.journal.unwind_to(savepoint);
    for undo in undos.into_iter().rev() {
      match undo {
        Undo::Balance {
          ledger,
          holder,
          prev,
        } => {
          if let Some(entry) = self.ledgers.get_mut(&ledger) {
            entry.balances.insert(holder, prev);
          }
        }
        Undo::Allowance {
          ledger,
          owner,
          spender,
          prev,
        } => {
          if let Some(entry) = self.ledgers.get_mut(&ledger) {
            entry.allowances.insert((owner, spender), prev);
          }
        }
        Undo::Supply { ledger, prev } => {
          if let Some(entry) = self.ledgers.get_mut(&ledger) {
            entry.supply = prev;
          }
        }
        Undo::Nonce {
          ledger,
          owner,
          prev,
        } => {
          if let Some(entry) = self.ledgers.get_mut(&ledger) {
            entry.nonces.insert(owner, prev);
          }
        }
        Undo::Reserve { asset, prev } => {
          if let Some(pool) = self.pools.get_mut(&asset) {
            pool.reserve = prev;
          }
        }
        Undo::Phase { asset, prev } => {
          if let Some(pool) = self.pools.get_mut(&asset) {
            pool.phase = prev;
          }
        }
        Undo::PoolCreated { asset } => {
          self.pools.remove(&asset);
        }
        Undo::Event => {
          self.events.pop();
        }
      }
    }
  }

  /// Drops the undo log once the top-level operation has fully succeeded.
  pub(crate) fn commit(&mut self) {
    self.journal.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rollback_restores_balances_and_events() {
    let mut state = EngineState::default();
    let ledger = Pubkey::new_unique();
    let holder = Pubkey::new_unique();
    state.set_balance(ledger, holder, Amount::new(5));
    state.commit();

    let savepoint = state.savepoint();
    state.set_balance(ledger, holder, Amount::new(99));
    state.set_supply(ledger, Amount::new(99));
    state.push_event(Event::Mint {
      asset: ledger,
      caller: holder,
      amount: Amount::new(99),
    });
    state.rollback_to(savepoint);

    assert_eq!(state.balance_of(ledger, holder), Amount::new(5));
    assert_eq!(state.supply_of(ledger), Amount::zero());
    assert!(state.events().is_empty());
    assert!(state.journal.is_empty());
  }

  #[test]
  fn rollback_unwinds_newest_first() {
    let mut state = EngineState::default();
    let ledger = Pubkey::new_unique();
    let holder = Pubkey::new_unique();
    let savepoint = state.savepoint();
    state.set_balance(ledger, holder, Amount::new(1));
    state.set_balance(ledger, holder, Amount::new(2));
    state.set_balance(ledger, holder, Amount::new(3));
    state.rollback_to(savepoint);
    assert_eq!(state.balance_of(ledger, holder), Amount::zero());
  }

  #[test]
  fn partial_rollback_keeps_earlier_writes() {
    let mut state = EngineState::default();
    let ledger = Pubkey::new_unique();
    let holder = Pubkey::new_unique();
    state.set_balance(ledger, holder, Amount::new(10));
    let savepoint = state.savepoint();
    state.set_balance(ledger, holder, Amount::new(20));
    state.rollback_to(savepoint);
    assert_eq!(state.balance_of(ledger, holder), Amount::new(10));
    assert!(!state.journal.is_empty());
  }
}
