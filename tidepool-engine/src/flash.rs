use anchor_lang::prelude::*;

use tidepool_core::amount::Amount;
use tidepool_core::fees::required_repayment;

use crate::engine::Engine;

/// Terms of an in-flight flash borrow. Exists only for the duration of one
/// `borrow` call; never persist a loan or reenter with a stale one.
#[derive(Debug, Clone, Copy)]
pub struct Loan {
  /// Backing-asset ledger the principal was drawn from.
  pub asset: Pubkey,
  /// Vault account the repayment must land in.
  pub pool: Pubkey,
  /// Account the principal was credited to.
  pub borrower: Pubkey,
  pub principal: Amount,
  pub fee: Amount,
}

impl Loan {
  /// Minimum that must be back in the pool before the callback returns.
  pub fn repayment(&self) -> Result<Amount> {
    required_repayment(self.principal, self.fee)
  }
}

/// Implemented by any code that borrows pooled funds mid-operation. By the
/// time the callback runs the principal has already been credited to the
/// borrower; the callback may run arbitrary logic, including reentering this
/// or other pools, but must leave `principal + fee` in the pool's tracked
/// balance or the entire enclosing operation is rolled back.
pub trait FlashBorrower {
  fn on_borrow(
    &mut self,
    engine: &mut Engine,
    loan: &Loan,
    data: &[u8],
  ) -> Result<()>;
}

/// Terms of an in-flight flash payment routed through the router.
#[derive(Debug, Clone, Copy)]
pub struct FlashPayment {
  pub payer: Pubkey,
  pub merchant: Pubkey,
  pub asset: Pubkey,
  pub amount: Amount,
}

/// Router-side callback, invoked before the payer's funds are pulled so the
/// recipient can put the payer in funds first. A failing callback, or a payer
/// still unfunded afterwards, unwinds the whole payment.
pub trait FlashRecipient {
  fn after_pay(
    &mut self,
    engine: &mut Engine,
    payment: &FlashPayment,
    data: &[u8],
  ) -> Result<()>;
}
