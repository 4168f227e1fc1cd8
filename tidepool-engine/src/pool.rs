use anchor_lang::prelude::*;
use fix::prelude::*;

use tidepool_core::amount::Amount;
use tidepool_core::error::CoreError::{
  FeeOverflow, InsufficientAmount, InsufficientLiquidity,
  InsufficientLiquidityBurned, InsufficientRepayment, UnknownPool,
};
use tidepool_core::fees::flash_fee;
use tidepool_core::issuance::{claims_for_deposit, redemption_amount};

use crate::engine::{Ctx, Engine};
use crate::events::Event;
use crate::flash::{FlashBorrower, Loan};

/// Per-operation settlement phases. Every path collapses back to `Idle`
/// before the operation commits or unwinds; no later operation can observe
/// an intermediate phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Idle,
  TransferPending,
  CallbackRunning,
  Settled,
  Aborted,
}

/// One pool per asset: a reserve of that asset plus the proportional claim
/// token issued against it.
#[derive(Debug)]
pub struct PoolState {
  /// Backing-asset ledger id, immutable after construction.
  pub asset: Pubkey,
  /// Vault account holding the reserve.
  pub account: Pubkey,
  /// Ledger id of this pool's claim token.
  pub claim: Pubkey,
  /// Cached last-known vault balance; synced at the end of every mutating
  /// operation.
  pub reserve: Amount,
  pub fee_rate: UFix64<N3>,
  pub phase: Phase,
}

impl Engine {
  /// Issues claims to `to` against whatever asset balance has arrived in the
  /// pool's vault since the last sync.
  pub fn pool_mint(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    to: Pubkey,
  ) -> Result<Amount> {
    self.transactional(|engine| engine.mint_claims(ctx, asset, to))
  }

  /// Burns whatever claim balance the pool is currently holding of itself
  /// and pays the redemption to `to`.
  pub fn pool_burn(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    to: Pubkey,
  ) -> Result<Amount> {
    self.transactional(|engine| engine.burn_claims(ctx, asset, to))
  }

  /// Lends `amount` to `borrower_account` for the duration of the callback.
  /// The callback may run arbitrary logic, including reentering this pool;
  /// when it returns, the vault must hold at least its prior reserve plus
  /// the fee or the entire operation, transfer-out included, is unwound.
  pub fn borrow(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    amount: Amount,
    borrower_account: Pubkey,
    borrower: &mut dyn FlashBorrower,
    data: &[u8],
  ) -> Result<()> {
    self.transactional(|engine| {
      if amount == Amount::zero() {
        return Err(InsufficientAmount.into());
      }
      let pool = engine.state.pool(&asset).ok_or(UnknownPool)?;
      let (account, fee_rate, before) =
        (pool.account, pool.fee_rate, pool.reserve);
      if amount > before {
        return Err(InsufficientLiquidity.into());
      }
      let fee = flash_fee(amount, fee_rate)?;
      tracing::debug!(
        caller = %ctx.caller,
        %asset,
        borrower = %borrower_account,
        principal = amount.bits,
        fee = fee.bits,
        "flash borrow"
      );

      engine.state.set_phase(asset, Phase::TransferPending);
      engine
        .state
        .ledger_transfer(asset, account, borrower_account, amount)?;

      engine.state.set_phase(asset, Phase::CallbackRunning);
      let loan = Loan {
        asset,
        pool: account,
        borrower: borrower_account,
        principal: amount,
        fee,
      };
      borrower.on_borrow(engine, &loan, data)?;

      // The vault is re-read after the callback, so nested activity is
      // already reflected here.
      let after = engine.state.balance_of(asset, account);
      let owed = before.checked_add(&fee).ok_or(FeeOverflow)?;
      if after < owed {
        engine.state.set_phase(asset, Phase::Aborted);
        return Err(InsufficientRepayment.into());
      }
      let surplus = after.checked_sub(&owed).ok_or(InsufficientRepayment)?;

      engine.state.set_phase(asset, Phase::Settled);
      engine.state.set_reserve(asset, after);
      engine.state.push_event(Event::Borrow {
        asset,
        borrower: borrower_account,
        amount,
        fee,
        surplus,
      });
      engine.state.set_phase(asset, Phase::Idle);
      Ok(())
    })
  }

  pub(crate) fn mint_claims(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    to: Pubkey,
  ) -> Result<Amount> {
    let pool = self.state.pool(&asset).ok_or(UnknownPool)?;
    let (account, claim, reserve) = (pool.account, pool.claim, pool.reserve);
    let live = self.state.balance_of(asset, account);
    let deposit = live.checked_sub(&reserve).ok_or(InsufficientAmount)?;
    if deposit == Amount::zero() {
      return Err(InsufficientAmount.into());
    }
    let claim_supply = self.state.supply_of(claim);
    let claims = claims_for_deposit(deposit, claim_supply, reserve)?;
    self.state.ledger_mint(claim, to, claims)?;
    self.state.set_reserve(asset, live);
    self.state.push_event(Event::Mint {
      asset,
      caller: ctx.caller,
      amount: deposit,
    });
    Ok(claims)
  }

  pub(crate) fn burn_claims(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    to: Pubkey,
  ) -> Result<Amount> {
    let pool = self.state.pool(&asset).ok_or(UnknownPool)?;
    let (account, claim, reserve) = (pool.account, pool.claim, pool.reserve);
    let claims_to_burn = self.state.balance_of(claim, account);
    if claims_to_burn == Amount::zero() {
      return Err(InsufficientLiquidityBurned.into());
    }
    let claim_supply = self.state.supply_of(claim);
    let asset_out = redemption_amount(claims_to_burn, reserve, claim_supply)?;
    if asset_out > reserve {
      return Err(InsufficientLiquidity.into());
    }
    self.state.ledger_transfer(asset, account, to, asset_out)?;
    self.state.ledger_burn(claim, account, claims_to_burn)?;
    let remaining =
      reserve.checked_sub(&asset_out).ok_or(InsufficientLiquidity)?;
    self.state.set_reserve(asset, remaining);
    self.state.push_event(Event::Burn {
      asset,
      caller: ctx.caller,
      amount: asset_out,
      to,
    });
    Ok(asset_out)
  }
}
