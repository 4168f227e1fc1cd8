use fix::prelude::*;
use fix::typenum::Z0;

/// Raw token base units. Every ledger balance, reserve, and claim amount in
/// the engine is denominated in these.
pub type Amount = UFix64<Z0>;

/// Sentinel for an unlimited allowance; never decremented on spend.
#[must_use]
pub fn unlimited() -> Amount {
  Amount::new(u64::MAX)
}

/// Floor integer square root by Newton's method.
///
/// ```txt
/// floor_sqrt(n)^2 <= n < (floor_sqrt(n) + 1)^2
/// ```
#[must_use]
pub fn floor_sqrt(amount: Amount) -> Amount {
  if amount.bits < 2 {
    return amount;
  }
  // Widened so the initial estimate cannot overflow at u64::MAX.
  let n = u128::from(amount.bits);
  let mut x = n;
  let mut y = (x + 1) / 2;
  while y < x {
    x = y;
    y = (x + n / x) / 2;
  }
  Amount::new(x as u64)
}
