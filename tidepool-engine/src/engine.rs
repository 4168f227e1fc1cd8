use anchor_lang::prelude::*;
use fix::prelude::*;

use tidepool_core::amount::Amount;

use crate::events::Event;
use crate::registry::derive_id;
use crate::state::EngineState;

const ROUTER_DOMAIN: &[u8] = b"tidepool:router:v1";
const NATIVE_DOMAIN: &[u8] = b"tidepool:native:v1";

/// Identity and wall-clock context for one operation. The clock is read once
/// at operation start; deadlines inside the operation all see the same time.
#[derive(Debug, Clone, Copy)]
pub struct Ctx {
  pub caller: Pubkey,
  pub now: i64,
}

impl Ctx {
  #[must_use]
  pub fn new(caller: Pubkey, now: i64) -> Ctx {
    Ctx { caller, now }
  }
}

/// Construction-time settings.
pub struct EngineConfig {
  /// Flash-borrow fee, per mille of principal.
  pub flash_fee_rate: UFix64<N3>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    EngineConfig {
      flash_fee_rate: UFix64::new(1),
    }
  }
}

/// The settlement engine: single-writer, reactive, one logical operation at
/// a time. Every entry point runs inside a journal savepoint; the whole
/// router/pool call graph of a request commits or unwinds as one unit.
pub struct Engine {
  pub(crate) state: EngineState,
  router: Pubkey,
  native: Pubkey,
  fee_rate: UFix64<N3>,
  depth: u32,
}

impl Engine {
  #[must_use]
  pub fn new(config: EngineConfig) -> Engine {
    Engine {
      state: EngineState::default(),
      router: derive_id(ROUTER_DOMAIN, &Pubkey::default()),
      native: derive_id(NATIVE_DOMAIN, &Pubkey::default()),
      fee_rate: config.flash_fee_rate,
      depth: 0,
    }
  }

  /// The spender identity callers approve (or permit) to move their funds.
  #[must_use]
  pub fn router_id(&self) -> Pubkey {
    self.router
  }

  /// Ledger id of the wrapped-native asset.
  #[must_use]
  pub fn native_asset(&self) -> Pubkey {
    self.native
  }

  pub(crate) fn fee_rate(&self) -> UFix64<N3> {
    self.fee_rate
  }

  #[must_use]
  pub fn balance_of(&self, ledger: Pubkey, holder: Pubkey) -> Amount {
    self.state.balance_of(ledger, holder)
  }

  #[must_use]
  pub fn total_supply(&self, ledger: Pubkey) -> Amount {
    self.state.supply_of(ledger)
  }

  #[must_use]
  pub fn allowance(
    &self,
    ledger: Pubkey,
    owner: Pubkey,
    spender: Pubkey,
  ) -> Amount {
    self.state.allowance(ledger, owner, spender)
  }

  #[must_use]
  pub fn events(&self) -> &[Event] {
    self.state.events()
  }

  /// Drains the settlement record log. A no-op mid-operation: callbacks must
  /// not tamper with records the journal may still unwind.
  pub fn drain_events(&mut self) -> Vec<Event> {
    if self.depth > 0 {
      return Vec::new();
    }
    self.state.take_events()
  }

  /// Credits external inflow of an asset. This is the host-side bridge for
  /// funds arriving from outside the engine's ledgers.
  pub fn deposit(
    &mut self,
    asset: Pubkey,
    to: Pubkey,
    amount: Amount,
  ) -> Result<()> {
    self.transactional(|engine| engine.state.ledger_mint(asset, to, amount))
  }

  /// Grants `spender` the right to move up to `value` of the caller's
  /// holdings on `ledger`.
  pub fn approve(
    &mut self,
    ctx: Ctx,
    ledger: Pubkey,
    spender: Pubkey,
    value: Amount,
  ) -> Result<()> {
    self.transactional(|engine| {
      engine.state.ledger_approve(ledger, ctx.caller, spender, value);
      Ok(())
    })
  }

  /// Moves the caller's own holdings.
  pub fn transfer(
    &mut self,
    ctx: Ctx,
    ledger: Pubkey,
    to: Pubkey,
    amount: Amount,
  ) -> Result<()> {
    self.transactional(|engine| {
      engine.state.ledger_transfer(ledger, ctx.caller, to, amount)
    })
  }

  /// Runs `op` inside a savepoint. On failure the savepoint is unwound
  /// before the error surfaces, so a nested failure a callback chooses to
  /// swallow still leaves no partial effects; on top-level success the
  /// journal is dropped and the state becomes durable.
  pub(crate) fn transactional<T>(
    &mut self,
    op: impl FnOnce(&mut Engine) -> Result<T>,
  ) -> Result<T> {
    let savepoint = self.state.savepoint();
    self.depth += 1;
    let out = op(self);
    self.depth -= 1;
    match out {
      Ok(value) => {
        if self.depth == 0 {
          self.state.commit();
        }
        Ok(value)
      }
      Err(err) => {
        self.state.rollback_to(savepoint);
        Err(err)
      }
    }
  }
}
