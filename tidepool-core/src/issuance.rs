use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::amount::{floor_sqrt, Amount};
use crate::error::CoreError::{
  InsufficientLiquidityMinted, IssuanceOverflow, RedemptionOverflow,
};

/// Prices the first deposit into an empty pool on the square-root curve, so
/// an early large depositor does not capture a disproportionate claim share.
///
/// ```txt
/// claims = floor(sqrt(deposit))
/// ```
pub fn first_issuance(deposit: Amount) -> Result<Amount> {
  let claims = floor_sqrt(deposit);
  if claims == Amount::zero() {
    Err(InsufficientLiquidityMinted.into())
  } else {
    Ok(claims)
  }
}

/// Prices a deposit against an existing reserve proportionally to the
/// outstanding claim supply.
///
/// ```txt
/// claims = floor(deposit * claim_supply / reserve)
/// ```
pub fn proportional_issuance(
  deposit: Amount,
  claim_supply: Amount,
  reserve: Amount,
) -> Result<Amount> {
  deposit
    .mul_div_floor(claim_supply, reserve)
    .ok_or(IssuanceOverflow.into())
}

/// Dispatches on whether a proportion exists yet: square-root curve for the
/// degenerate first deposit, linear scaling afterwards.
pub fn claims_for_deposit(
  deposit: Amount,
  claim_supply: Amount,
  reserve: Amount,
) -> Result<Amount> {
  if claim_supply == Amount::zero() {
    first_issuance(deposit)
  } else {
    proportional_issuance(deposit, claim_supply, reserve)
  }
}

/// Asset returned for burning claims; the exact linear inverse of the
/// proportional mint path.
///
/// ```txt
/// asset_out = floor(claims * reserve / claim_supply)
/// ```
pub fn redemption_amount(
  claims: Amount,
  reserve: Amount,
  claim_supply: Amount,
) -> Result<Amount> {
  claims
    .mul_div_floor(reserve, claim_supply)
    .ok_or(RedemptionOverflow.into())
}
