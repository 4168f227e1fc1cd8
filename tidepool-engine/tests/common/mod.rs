#![allow(dead_code)]

use anchor_lang::prelude::Pubkey;
use fix::prelude::*;

use tidepool_core::amount::{unlimited, Amount};
use tidepool_core::deadline::Deadline;
use tidepool_core::tag::Tag;
use tidepool_engine::{Ctx, Engine, EngineConfig};

pub const NOW: i64 = 1_700_000_000;

pub fn ctx(caller: Pubkey) -> Ctx {
  Ctx::new(caller, NOW)
}

pub fn amt(n: u64) -> Amount {
  Amount::new(n)
}

pub fn tag(reference: &str) -> Tag {
  Tag::from_ascii(reference)
}

pub fn far() -> Deadline {
  Deadline::MAX
}

/// One funded payer, one merchant, one asset, router pre-approved by the
/// payer for the asset ledger.
pub struct Fixture {
  pub engine: Engine,
  pub asset: Pubkey,
  pub payer: Pubkey,
  pub merchant: Pubkey,
}

impl Fixture {
  pub fn new() -> Fixture {
    let mut engine = Engine::new(EngineConfig::default());
    let asset = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let merchant = Pubkey::new_unique();
    engine.deposit(asset, payer, amt(10_000)).expect("deposit");
    let router = engine.router_id();
    engine
      .approve(ctx(payer), asset, router, unlimited())
      .expect("approve");
    Fixture {
      engine,
      asset,
      payer,
      merchant,
    }
  }

  /// Seeds the asset pool the low-level way: transfer into the vault, then
  /// mint the arrived balance to `to`. Returns the claims issued.
  pub fn seed_pool(&mut self, amount: u64, to: Pubkey) -> Amount {
    let vault = self.engine.create_pool(self.asset).expect("pool");
    self
      .engine
      .transfer(ctx(self.payer), self.asset, vault, amt(amount))
      .expect("seed transfer");
    self
      .engine
      .pool_mint(ctx(self.payer), self.asset, to)
      .expect("seed mint")
  }

  /// Approves the router to pull `owner`'s claim tokens for the fixture
  /// asset.
  pub fn approve_claims(&mut self, owner: Pubkey) {
    let claim = self.engine.claim_token(self.asset).expect("claim token");
    let router = self.engine.router_id();
    self
      .engine
      .approve(ctx(owner), claim, router, unlimited())
      .expect("claim approve");
  }
}
