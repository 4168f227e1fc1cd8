use anchor_lang::prelude::Pubkey;

use tidepool_core::amount::Amount;

use crate::pool::Phase;

/// One reversible primitive write. Every mutation of shared state during an
/// operation records the value it overwrote, so the enclosing operation can
/// be unwound from any nesting depth.
#[derive(Debug)]
pub enum Undo {
  Balance {
    ledger: Pubkey,
    holder: Pubkey,
    prev: Amount,
  },
  Allowance {
    ledger: Pubkey,
    owner: Pubkey,
    spender: Pubkey,
    prev: Amount,
  },
  Supply {
    ledger: Pubkey,
    prev: Amount,
  },
  Nonce {
    ledger: Pubkey,
    owner: Pubkey,
    prev: u64,
  },
  Reserve {
    asset: Pubkey,
    prev: Amount,
  },
  Phase {
    asset: Pubkey,
    prev: Phase,
  },
  PoolCreated {
    asset: Pubkey,
  },
  Event,
}

/// Position in the journal to unwind back to when an operation fails.
#[derive(Debug, Clone, Copy)]
pub struct Savepoint(pub(crate) usize);

/// Write-ahead undo log for the active operation. Entries accumulate across
/// nested calls and are dropped wholesale when the top-level operation
/// commits; a failing operation at any depth unwinds back to its own
/// savepoint before surfacing the error.
#[derive(Debug, Default)]
pub struct Journal {
  entries: Vec<Undo>,
}

impl Journal {
  pub fn record(&mut self, undo: Undo) {
    self.entries.push(undo);
  }

  #[must_use]
  pub fn savepoint(&self) -> Savepoint {
    Savepoint(self.entries.len())
  }

  /// Removes and returns everything recorded since the savepoint, oldest
  /// first. The caller applies them in reverse.
  pub fn unwind_to(&mut self, savepoint: Savepoint) -> Vec<Undo> {
    self.entries.split_off(savepoint.0)
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
