use anchor_lang::prelude::*;

#[error_code]
pub enum AmmError {
    #[msg("Fee cannot exceed 1000 basis points (10%).")]
    InvalidFee,

    #[msg("Invalid amount. Must be greater than 0.")]
    InvalidAmount,

    #[msg("Invalid trade type. Must be 0 (BuyYes) or 1 (BuyNo).")]
    InvalidTradeType,

    #[msg("Pool is not active.")]
    PoolNotActive,

    #[msg("Pool is already closed.")]
    PoolAlreadyClosed,

    #[msg("Output below minimum. Slippage exceeded.")]
    SlippageExceeded,

    #[msg("Insufficient pool liquidity.")]
    InsufficientLiquidity,

    #[msg("Math overflow.")]
    MathOverflow,

    #[msg("Unauthorized.")]
    Unauthorized,
}
