use anchor_lang::prelude::*;
use fix::prelude::*;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;

use tidepool_core::amount::Amount;
use tidepool_core::error::CoreError::AuthorizationFailed;

use crate::engine::{Ctx, Engine};

const PERMIT_DOMAIN: &[u8] = b"tidepool:permit:v1";

/// One-shot signed authorization standing in for a pre-set allowance. The
/// owner signs over the ledger, spender, value, their current nonce, and an
/// expiry; the nonce is consumed on use so a permit can never replay.
#[derive(Debug, Clone)]
pub struct Permit {
  pub value: Amount,
  pub expiry: i64,
  pub signature: Signature,
}

#[derive(AnchorSerialize)]
struct PermitMessage {
  ledger: Pubkey,
  owner: Pubkey,
  spender: Pubkey,
  value: u64,
  nonce: u64,
  expiry: i64,
}

/// Canonical signing bytes: domain separator followed by the borsh-encoded
/// message.
pub fn permit_digest(
  ledger: Pubkey,
  owner: Pubkey,
  spender: Pubkey,
  value: Amount,
  nonce: u64,
  expiry: i64,
) -> Result<Vec<u8>> {
  let message = PermitMessage {
    ledger,
    owner,
    spender,
    value: value.bits,
    nonce,
    expiry,
  };
  let mut digest = PERMIT_DOMAIN.to_vec();
  message
    .serialize(&mut digest)
    .map_err(|_| AuthorizationFailed)?;
  Ok(digest)
}

impl Permit {
  /// Signs a permit with the owner's key.
  pub fn sign(
    owner: &Keypair,
    ledger: Pubkey,
    spender: Pubkey,
    value: Amount,
    nonce: u64,
    expiry: i64,
  ) -> Result<Permit> {
    let digest =
      permit_digest(ledger, owner.pubkey(), spender, value, nonce, expiry)?;
    Ok(Permit {
      value,
      expiry,
      signature: owner.sign_message(&digest),
    })
  }
}

impl Engine {
  /// Verifies and consumes a one-shot authorization from the operation
  /// caller toward the router: correct signer, current nonce, unexpired.
  pub(crate) fn apply_permit(
    &mut self,
    ctx: Ctx,
    ledger: Pubkey,
    permit: &Permit,
  ) -> Result<()> {
    let owner = ctx.caller;
    let spender = self.router_id();
    if ctx.now > permit.expiry {
      return Err(AuthorizationFailed.into());
    }
    let nonce = self.state.nonce(ledger, owner);
    let digest = permit_digest(
      ledger,
      owner,
      spender,
      permit.value,
      nonce,
      permit.expiry,
    )?;
    if !permit.signature.verify(owner.as_ref(), &digest) {
      return Err(AuthorizationFailed.into());
    }
    self.state.set_nonce(ledger, owner, nonce + 1);
    self.state.set_allowance(ledger, owner, spender, permit.value);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::EngineConfig;

  const NOW: i64 = 1_700_000_000;

  #[test]
  fn permit_sets_allowance_and_bumps_nonce() -> Result<()> {
    let mut engine = Engine::new(EngineConfig::default());
    let keypair = Keypair::new();
    let owner = keypair.pubkey();
    let ledger = Pubkey::new_unique();
    let router = engine.router_id();
    let permit = Permit::sign(
      &keypair,
      ledger,
      router,
      Amount::new(500),
      0,
      NOW + 60,
    )?;
    engine.apply_permit(Ctx::new(owner, NOW), ledger, &permit)?;
    assert_eq!(engine.allowance(ledger, owner, router), Amount::new(500));
    assert_eq!(engine.state.nonce(ledger, owner), 1);
    Ok(())
  }

  #[test]
  fn replayed_permit_is_rejected() -> Result<()> {
    let mut engine = Engine::new(EngineConfig::default());
    let keypair = Keypair::new();
    let owner = keypair.pubkey();
    let ledger = Pubkey::new_unique();
    let permit = Permit::sign(
      &keypair,
      ledger,
      engine.router_id(),
      Amount::new(500),
      0,
      NOW + 60,
    )?;
    engine.apply_permit(Ctx::new(owner, NOW), ledger, &permit)?;
    // The nonce moved on, so the same signature no longer verifies.
    let out = engine.apply_permit(Ctx::new(owner, NOW), ledger, &permit);
    assert_eq!(out.err(), Some(AuthorizationFailed.into()));
    Ok(())
  }

  #[test]
  fn expired_permit_is_rejected() -> Result<()> {
    let mut engine = Engine::new(EngineConfig::default());
    let keypair = Keypair::new();
    let owner = keypair.pubkey();
    let ledger = Pubkey::new_unique();
    let permit = Permit::sign(
      &keypair,
      ledger,
      engine.router_id(),
      Amount::new(500),
      0,
      NOW - 1,
    )?;
    let out = engine.apply_permit(Ctx::new(owner, NOW), ledger, &permit);
    assert_eq!(out.err(), Some(AuthorizationFailed.into()));
    Ok(())
  }

  #[test]
  fn foreign_signature_is_rejected() -> Result<()> {
    let mut engine = Engine::new(EngineConfig::default());
    let keypair = Keypair::new();
    let imposter = Keypair::new();
    let ledger = Pubkey::new_unique();
    let permit = Permit::sign(
      &imposter,
      ledger,
      engine.router_id(),
      Amount::new(500),
      0,
      NOW + 60,
    )?;
    let out =
      engine.apply_permit(Ctx::new(keypair.pubkey(), NOW), ledger, &permit);
    assert_eq!(out.err(), Some(AuthorizationFailed.into()));
    Ok(())
  }
}
