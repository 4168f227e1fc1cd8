use anchor_lang::prelude::*;

use crate::error::CoreError::Expired;

/// Latest acceptable wall-clock time for an operation, in unix seconds.
/// Evaluated once against the time read at operation start; an in-flight
/// operation is never cancelled.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, AnchorSerialize, AnchorDeserialize,
)]
pub struct Deadline(pub i64);

impl Deadline {
  pub const MAX: Deadline = Deadline(i64::MAX);

  pub fn check(self, now: i64) -> Result<()> {
    if now > self.0 {
      Err(Expired.into())
    } else {
      Ok(())
    }
  }
}
