use anchor_lang::prelude::error_code;

#[error_code]
pub enum CoreError {
  // `deadline`
  #[msg("Operation deadline has passed.")]
  Expired = 6000,
  // amounts
  #[msg("Zero or otherwise invalid quantity supplied.")]
  InsufficientAmount,
  #[msg("Overflow in checked amount arithmetic.")]
  AmountOverflow,
  // `issuance`
  #[msg("Deposit too small to issue any claims.")]
  InsufficientLiquidityMinted,
  #[msg("No claim balance deposited to burn.")]
  InsufficientLiquidityBurned,
  #[msg("Arithmetic error while pricing claim issuance.")]
  IssuanceOverflow,
  #[msg("Arithmetic error while pricing claim redemption.")]
  RedemptionOverflow,
  // `fees`
  #[msg("Arithmetic error while computing the flash fee.")]
  FeeOverflow,
  // pool
  #[msg("Reserve too small to cover the requested amount.")]
  InsufficientLiquidity,
  #[msg("Computed output is below the caller's slippage floor.")]
  InsufficientOutputAmount,
  #[msg("Flash borrow was not repaid with its fee.")]
  InsufficientRepayment,
  // ledger
  #[msg("Transfer exceeds the holder's balance.")]
  InsufficientBalance,
  #[msg("Missing or invalid allowance or permit.")]
  AuthorizationFailed,
  // registry
  #[msg("No pool exists for the given asset.")]
  UnknownPool,
}
