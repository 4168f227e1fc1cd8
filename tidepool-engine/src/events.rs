use anchor_lang::prelude::*;

use tidepool_core::amount::Amount;
use tidepool_core::tag::Tag;

/// Settlement records emitted by pools and the router. The log is part of
/// journaled state: an aborted operation leaves no records behind.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  PoolCreated {
    asset: Pubkey,
    claim: Pubkey,
    index: u64,
  },
  Mint {
    asset: Pubkey,
    caller: Pubkey,
    amount: Amount,
  },
  Burn {
    asset: Pubkey,
    caller: Pubkey,
    amount: Amount,
    to: Pubkey,
  },
  Borrow {
    asset: Pubkey,
    borrower: Pubkey,
    amount: Amount,
    fee: Amount,
    surplus: Amount,
  },
  Pay {
    payer: Pubkey,
    merchant: Pubkey,
    asset: Pubkey,
    tag: Tag,
    amount: Amount,
    price_hint: u64,
  },
  Refund {
    merchant: Pubkey,
    to: Pubkey,
    asset: Pubkey,
    tag: Tag,
    amount: Amount,
  },
  Flash {
    payer: Pubkey,
    merchant: Pubkey,
    asset: Pubkey,
    recipient: Pubkey,
    amount: Amount,
  },
}
