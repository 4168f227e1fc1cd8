use anchor_lang::prelude::*;
use fix::prelude::*;
use solana_sdk::hash::hashv;

use tidepool_core::amount::Amount;
use tidepool_core::error::CoreError::UnknownPool;

use crate::engine::Engine;
use crate::events::Event;
use crate::pool::{Phase, PoolState};

const CLAIM_DOMAIN: &[u8] = b"tidepool:claim:v1";
const VAULT_DOMAIN: &[u8] = b"tidepool:vault:v1";

/// Deterministic, collision-resistant id derivation for engine-owned
/// accounts and ledgers.
pub(crate) fn derive_id(domain: &[u8], seed: &Pubkey) -> Pubkey {
  Pubkey::new_from_array(hashv(&[domain, seed.as_ref()]).to_bytes())
}

impl Engine {
  /// Claim-token ledger id for an asset's pool.
  pub fn claim_token(&self, asset: Pubkey) -> Result<Pubkey> {
    self
      .state
      .pool(&asset)
      .map(|p| p.claim)
      .ok_or(UnknownPool.into())
  }

  /// Vault account holding an asset pool's reserve.
  pub fn pool_account(&self, asset: Pubkey) -> Result<Pubkey> {
    self
      .state
      .pool(&asset)
      .map(|p| p.account)
      .ok_or(UnknownPool.into())
  }

  pub fn reserve_of(&self, asset: Pubkey) -> Result<Amount> {
    self
      .state
      .pool(&asset)
      .map(|p| p.reserve)
      .ok_or(UnknownPool.into())
  }

  /// Creates the pool for an asset if it does not exist yet and returns its
  /// vault account.
  pub fn create_pool(&mut self, asset: Pubkey) -> Result<Pubkey> {
    self.transactional(|engine| engine.pool_or_create(asset))
  }

  /// Single mutation path for pool creation: looks up the pool for an asset,
  /// lazily creating it on first reference.
  pub(crate) fn pool_or_create(&mut self, asset: Pubkey) -> Result<Pubkey> {
    if self.state.pool(&asset).is_none() {
      let claim = derive_id(CLAIM_DOMAIN, &asset);
      let account = derive_id(VAULT_DOMAIN, &asset);
      self.state.insert_pool(
        asset,
        PoolState {
          asset,
          account,
          claim,
          reserve: Amount::zero(),
          fee_rate: self.fee_rate(),
          phase: Phase::Idle,
        },
      );
      let index = self.state.pool_count();
      self.state.push_event(Event::PoolCreated {
        asset,
        claim,
        index,
      });
      tracing::info!(%asset, %claim, index, "pool created");
    }
    self.pool_account(asset)
  }
}
