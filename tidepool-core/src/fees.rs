use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::amount::Amount;
use crate::error::CoreError::FeeOverflow;

/// Flash-borrow fee on a principal at a fixed per-mille rate, rounded up so
/// no nonzero loan is ever free.
///
/// ```txt
/// fee = ceil(amount * rate)
/// ```
pub fn flash_fee(amount: Amount, rate: UFix64<N3>) -> Result<Amount> {
  amount
    .mul_div_ceil(rate, UFix64::<N3>::one())
    .ok_or(FeeOverflow.into())
}

/// Principal plus fee owed back to the pool before a borrow settles.
pub fn required_repayment(
  principal: Amount,
  fee: Amount,
) -> Result<Amount> {
  principal.checked_add(&fee).ok_or(FeeOverflow.into())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn per_mille() -> UFix64<N3> {
    UFix64::new(1)
  }

  #[test]
  fn fee_rounds_up() -> Result<()> {
    // 99 * 0.001 = 0.099, charged as 1.
    assert_eq!(flash_fee(Amount::new(99), per_mille())?, Amount::new(1));
    Ok(())
  }

  #[test]
  fn fee_at_minimum_amount() -> Result<()> {
    // Even a loan of a single unit pays a unit of fee.
    assert_eq!(flash_fee(Amount::new(1), per_mille())?, Amount::new(1));
    Ok(())
  }

  #[test]
  fn fee_at_rate_inverse() -> Result<()> {
    // 1000 * 0.001 is exact; the next unit tips the ceiling.
    assert_eq!(flash_fee(Amount::new(1000), per_mille())?, Amount::new(1));
    assert_eq!(flash_fee(Amount::new(1001), per_mille())?, Amount::new(2));
    Ok(())
  }

  #[test]
  fn zero_principal_zero_fee() -> Result<()> {
    assert_eq!(flash_fee(Amount::zero(), per_mille())?, Amount::zero());
    Ok(())
  }

  #[test]
  fn repayment_overflow_guard() {
    let out = required_repayment(Amount::new(u64::MAX), Amount::new(1));
    assert_eq!(out.err(), Some(FeeOverflow.into()));
  }
}
