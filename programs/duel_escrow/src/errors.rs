use anchor_lang::prelude::*;

#[error_code]
pub enum DuelError {
    #[msg("Bet amount outside the allowed range for this currency.")]
    InvalidAmount,

    #[msg("Invalid direction. Must be 0 (Up) or 1 (Down).")]
    InvalidDirection,

    #[msg("Invalid currency.")]
    InvalidCurrency,

    #[msg("Price must be greater than 0.")]
    InvalidPrice,

    #[msg("Duel is not in the required state for this instruction.")]
    WrongState,

    #[msg("Duel is not open for joining.")]
    DuelNotJoinable,

    #[msg("Duel expired before an opponent joined.")]
    DuelExpired,

    #[msg("Players cannot join their own duel.")]
    SelfJoinForbidden,

    #[msg("Duel duration has not elapsed yet.")]
    TooEarly,

    #[msg("Duel cannot be cancelled from its current state.")]
    NotCancellable,

    #[msg("Unauthorized.")]
    Unauthorized,

    #[msg("Math overflow.")]
    MathOverflow,
}
