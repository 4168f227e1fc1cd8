use anchor_lang::prelude::*;
use fix::prelude::*;

use tidepool_core::amount::Amount;
use tidepool_core::deadline::Deadline;
use tidepool_core::error::CoreError::{
  InsufficientAmount, InsufficientLiquidityBurned, InsufficientOutputAmount,
  UnknownPool,
};
use tidepool_core::issuance::redemption_amount;
use tidepool_core::tag::Tag;

use crate::engine::{Ctx, Engine};
use crate::events::Event;
use crate::flash::{FlashPayment, FlashRecipient};
use crate::permit::Permit;

impl Engine {
  /// Settles a payment: pulls `amount` of `asset` from the caller into the
  /// asset's pool (created on first use) and issues the minted claims to the
  /// merchant. `price_hint` is an opaque oracle-supplied reference rate,
  /// recorded for audit and never used in the mint formula.
  pub fn pay(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    amount: Amount,
    price_hint: u64,
    request_tag: Tag,
    merchant: Pubkey,
    deadline: Deadline,
  ) -> Result<Amount> {
    self.pay_entry(
      ctx,
      asset,
      amount,
      price_hint,
      request_tag,
      merchant,
      deadline,
      None,
    )
  }

  /// As `pay`, authorized by a one-shot permit on the asset ledger instead
  /// of a pre-set allowance.
  #[allow(clippy::too_many_arguments)]
  pub fn pay_with_permit(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    amount: Amount,
    price_hint: u64,
    request_tag: Tag,
    merchant: Pubkey,
    deadline: Deadline,
    permit: &Permit,
  ) -> Result<Amount> {
    self.pay_entry(
      ctx,
      asset,
      amount,
      price_hint,
      request_tag,
      merchant,
      deadline,
      Some(permit),
    )
  }

  /// As `pay`, but the funds arrive as native value attached to the call;
  /// the router wraps them into the wrapper asset credited straight to the
  /// pool's vault.
  pub fn pay_native(
    &mut self,
    ctx: Ctx,
    request_tag: Tag,
    merchant: Pubkey,
    price_hint: u64,
    deadline: Deadline,
    value: Amount,
  ) -> Result<Amount> {
    self.transactional(|engine| {
      deadline.check(ctx.now)?;
      if value == Amount::zero() {
        return Err(InsufficientAmount.into());
      }
      let native = engine.native_asset();
      let account = engine.pool_or_create(native)?;
      engine.state.ledger_mint(native, account, value)?;
      let router = engine.router_id();
      let claims =
        engine.mint_claims(Ctx::new(router, ctx.now), native, merchant)?;
      engine.state.push_event(Event::Pay {
        payer: ctx.caller,
        merchant,
        asset: native,
        tag: request_tag,
        amount: value,
        price_hint,
      });
      Ok(claims)
    })
  }

  /// Returns asset to `to` by burning `claim_amount` of the caller's claim
  /// tokens, pulled via allowance.
  pub fn refund(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    claim_amount: Amount,
    payment_tag: Tag,
    to: Pubkey,
    deadline: Deadline,
  ) -> Result<Amount> {
    self.refund_entry(ctx, asset, claim_amount, payment_tag, to, deadline, None)
  }

  /// As `refund`, authorized by a one-shot permit on the claim token instead
  /// of a pre-set allowance.
  pub fn refund_with_permit(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    claim_amount: Amount,
    payment_tag: Tag,
    to: Pubkey,
    deadline: Deadline,
    permit: &Permit,
  ) -> Result<Amount> {
    self.refund_entry(
      ctx,
      asset,
      claim_amount,
      payment_tag,
      to,
      deadline,
      Some(permit),
    )
  }

  /// Refund against the native-wrapper pool; the redemption is unwrapped
  /// back to native value released to `to`.
  pub fn refund_native(
    &mut self,
    ctx: Ctx,
    claim_amount: Amount,
    payment_tag: Tag,
    to: Pubkey,
    deadline: Deadline,
  ) -> Result<Amount> {
    self.refund_native_entry(ctx, claim_amount, payment_tag, to, deadline, None)
  }

  pub fn refund_native_with_permit(
    &mut self,
    ctx: Ctx,
    claim_amount: Amount,
    payment_tag: Tag,
    to: Pubkey,
    deadline: Deadline,
    permit: &Permit,
  ) -> Result<Amount> {
    self.refund_native_entry(
      ctx,
      claim_amount,
      payment_tag,
      to,
      deadline,
      Some(permit),
    )
  }

  /// As `refund` without a correlation tag, with a caller-supplied slippage
  /// floor checked before anything moves.
  pub fn withdraw(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    claim_amount: Amount,
    min_asset_out: Amount,
    to: Pubkey,
    deadline: Deadline,
  ) -> Result<Amount> {
    self
      .withdraw_entry(ctx, asset, claim_amount, min_asset_out, to, deadline, None)
  }

  pub fn withdraw_with_permit(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    claim_amount: Amount,
    min_asset_out: Amount,
    to: Pubkey,
    deadline: Deadline,
    permit: &Permit,
  ) -> Result<Amount> {
    self.withdraw_entry(
      ctx,
      asset,
      claim_amount,
      min_asset_out,
      to,
      deadline,
      Some(permit),
    )
  }

  pub fn withdraw_native(
    &mut self,
    ctx: Ctx,
    claim_amount: Amount,
    min_asset_out: Amount,
    to: Pubkey,
    deadline: Deadline,
  ) -> Result<Amount> {
    self.withdraw_native_entry(
      ctx,
      claim_amount,
      min_asset_out,
      to,
      deadline,
      None,
    )
  }

  pub fn withdraw_native_with_permit(
    &mut self,
    ctx: Ctx,
    claim_amount: Amount,
    min_asset_out: Amount,
    to: Pubkey,
    deadline: Deadline,
    permit: &Permit,
  ) -> Result<Amount> {
    self.withdraw_native_entry(
      ctx,
      claim_amount,
      min_asset_out,
      to,
      deadline,
      Some(permit),
    )
  }

  /// Flash payment: the recipient callback runs first so it can put the
  /// payer in funds, then the payment settles exactly like `pay`. Everything
  /// unwinds if the callback fails or the payer still cannot cover the
  /// amount.
  #[allow(clippy::too_many_arguments)]
  pub fn flash(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    amount: Amount,
    merchant: Pubkey,
    recipient_account: Pubkey,
    recipient: &mut dyn FlashRecipient,
    deadline: Deadline,
    data: &[u8],
  ) -> Result<Amount> {
    self.transactional(|engine| {
      deadline.check(ctx.now)?;
      if amount == Amount::zero() {
        return Err(InsufficientAmount.into());
      }
      let account = engine.pool_or_create(asset)?;
      let payment = FlashPayment {
        payer: ctx.caller,
        merchant,
        asset,
        amount,
      };
      recipient.after_pay(engine, &payment, data)?;
      let router = engine.router_id();
      engine
        .state
        .ledger_transfer_from(asset, router, ctx.caller, account, amount)?;
      let claims =
        engine.mint_claims(Ctx::new(router, ctx.now), asset, merchant)?;
      engine.state.push_event(Event::Flash {
        payer: ctx.caller,
        merchant,
        asset,
        recipient: recipient_account,
        amount,
      });
      Ok(claims)
    })
  }

  /// Asset a burn of `claims` would return right now.
  pub fn quote_redemption(
    &self,
    asset: Pubkey,
    claims: Amount,
  ) -> Result<Amount> {
    let pool = self.state.pool(&asset).ok_or(UnknownPool)?;
    let claim_supply = self.state.supply_of(pool.claim);
    if claim_supply == Amount::zero() {
      return Err(InsufficientLiquidityBurned.into());
    }
    redemption_amount(claims, pool.reserve, claim_supply)
  }

  #[allow(clippy::too_many_arguments)]
  fn pay_entry(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    amount: Amount,
    price_hint: u64,
    request_tag: Tag,
    merchant: Pubkey,
    deadline: Deadline,
    permit: Option<&Permit>,
  ) -> Result<Amount> {
    self.transactional(|engine| {
      deadline.check(ctx.now)?;
      if amount == Amount::zero() {
        return Err(InsufficientAmount.into());
      }
      let account = engine.pool_or_create(asset)?;
      if let Some(permit) = permit {
        engine.apply_permit(ctx, asset, permit)?;
      }
      let router = engine.router_id();
      engine
        .state
        .ledger_transfer_from(asset, router, ctx.caller, account, amount)?;
      let claims =
        engine.mint_claims(Ctx::new(router, ctx.now), asset, merchant)?;
      engine.state.push_event(Event::Pay {
        payer: ctx.caller,
        merchant,
        asset,
        tag: request_tag,
        amount,
        price_hint,
      });
      tracing::debug!(
        payer = %ctx.caller,
        %merchant,
        %asset,
        amount = amount.bits,
        "payment settled"
      );
      Ok(claims)
    })
  }

  #[allow(clippy::too_many_arguments)]
  fn refund_entry(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    claim_amount: Amount,
    payment_tag: Tag,
    to: Pubkey,
    deadline: Deadline,
    permit: Option<&Permit>,
  ) -> Result<Amount> {
    self.transactional(|engine| {
      deadline.check(ctx.now)?;
      if let Some(permit) = permit {
        let claim = engine.claim_token(asset)?;
        engine.apply_permit(ctx, claim, permit)?;
      }
      let returned = engine.refund_core(ctx, asset, claim_amount, to)?;
      engine.state.push_event(Event::Refund {
        merchant: ctx.caller,
        to,
        asset,
        tag: payment_tag,
        amount: returned,
      });
      tracing::debug!(
        merchant = %ctx.caller,
        %to,
        %asset,
        amount = returned.bits,
        "refund settled"
      );
      Ok(returned)
    })
  }

  fn refund_native_entry(
    &mut self,
    ctx: Ctx,
    claim_amount: Amount,
    payment_tag: Tag,
    to: Pubkey,
    deadline: Deadline,
    permit: Option<&Permit>,
  ) -> Result<Amount> {
    self.transactional(|engine| {
      deadline.check(ctx.now)?;
      let native = engine.native_asset();
      if let Some(permit) = permit {
        let claim = engine.claim_token(native)?;
        engine.apply_permit(ctx, claim, permit)?;
      }
      // The redemption lands on the router, then unwraps to native value
      // released to `to` by the wrapper collaborator.
      let router = engine.router_id();
      let returned = engine.refund_core(ctx, native, claim_amount, router)?;
      engine.state.ledger_burn(native, router, returned)?;
      engine.state.push_event(Event::Refund {
        merchant: ctx.caller,
        to,
        asset: native,
        tag: payment_tag,
        amount: returned,
      });
      Ok(returned)
    })
  }

  #[allow(clippy::too_many_arguments)]
  fn withdraw_entry(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    claim_amount: Amount,
    min_asset_out: Amount,
    to: Pubkey,
    deadline: Deadline,
    permit: Option<&Permit>,
  ) -> Result<Amount> {
    self.transactional(|engine| {
      deadline.check(ctx.now)?;
      if claim_amount == Amount::zero() {
        return Err(InsufficientAmount.into());
      }
      let quoted = engine.quote_redemption(asset, claim_amount)?;
      if quoted < min_asset_out {
        return Err(InsufficientOutputAmount.into());
      }
      if let Some(permit) = permit {
        let claim = engine.claim_token(asset)?;
        engine.apply_permit(ctx, claim, permit)?;
      }
      engine.refund_core(ctx, asset, claim_amount, to)
    })
  }

  #[allow(clippy::too_many_arguments)]
  fn withdraw_native_entry(
    &mut self,
    ctx: Ctx,
    claim_amount: Amount,
    min_asset_out: Amount,
    to: Pubkey,
    deadline: Deadline,
    permit: Option<&Permit>,
  ) -> Result<Amount> {
    self.transactional(|engine| {
      deadline.check(ctx.now)?;
      if claim_amount == Amount::zero() {
        return Err(InsufficientAmount.into());
      }
      let native = engine.native_asset();
      let quoted = engine.quote_redemption(native, claim_amount)?;
      if quoted < min_asset_out {
        return Err(InsufficientOutputAmount.into());
      }
      if let Some(permit) = permit {
        let claim = engine.claim_token(native)?;
        engine.apply_permit(ctx, claim, permit)?;
      }
      let router = engine.router_id();
      let returned = engine.refund_core(ctx, native, claim_amount, router)?;
      engine.state.ledger_burn(native, router, returned)?;
      tracing::debug!(%to, amount = returned.bits, "native withdrawal unwrapped");
      Ok(returned)
    })
  }

  /// Pull the caller's claims into the pool, then deposit-then-burn.
  fn refund_core(
    &mut self,
    ctx: Ctx,
    asset: Pubkey,
    claim_amount: Amount,
    to: Pubkey,
  ) -> Result<Amount> {
    if claim_amount == Amount::zero() {
      return Err(InsufficientAmount.into());
    }
    let account = self.pool_account(asset)?;
    let claim = self.claim_token(asset)?;
    let router = self.router_id();
    self
      .state
      .ledger_transfer_from(claim, router, ctx.caller, account, claim_amount)?;
    self.burn_claims(Ctx::new(router, ctx.now), asset, to)
  }
}
