use anchor_lang::prelude::*;

/// Seconds a Pending duel waits for an opponent.
pub const PENDING_TTL: i64 = 300;

/// Countdown between start dispatch and the duel going live.
pub const COUNTDOWN: i64 = 5;

/// Seconds an Active duel runs before it is due for resolution.
pub const DUEL_DURATION: i64 = 60;

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Global config PDA, seeds ["config"].
#[account]
pub struct Config {
    /// The only signer allowed to start, resolve and force-cancel duels.
    pub authority: Pubkey,
    /// Receives the platform fee cut of every resolved pot.
    pub fee_collector: Pubkey,
    /// Platform fee in basis points (500 = 5%).
    pub fee_bps: u16,
    /// Id the next CreateDuel will claim; also its PDA seed.
    pub next_duel_id: u64,
    pub bump: u8,
}

impl Config {
    pub const LEN: usize = 8 + 32 + 32 + 2 + 8 + 1;
}

/// Duel PDA, seeds ["duel", duel_id.to_le_bytes()].
#[account]
pub struct Duel {
    pub duel_id: u64,
    pub player1: Pubkey,
    /// Default pubkey until a player 2 joins.
    pub player2: Pubkey,
    /// Mint both stakes are denominated in.
    pub stake_mint: Pubkey,
    pub bet_amount: u64,
    pub currency: Currency,
    pub market_id: u16,
    /// Player 1's direction; player 2 always holds the complement.
    pub direction_p1: Direction,
    pub status: DuelStatus,
    /// 1e8 fixed-point. Zero until start_duel.
    pub entry_price: u64,
    /// 1e8 fixed-point. Zero until resolve_duel.
    pub exit_price: u64,
    /// Default pubkey unless status is Resolved.
    pub winner: Pubkey,
    pub created_at: i64,
    /// now + COUNTDOWN at start dispatch; the duel is live once the clock
    /// passes this value.
    pub started_at: i64,
    pub resolved_at: i64,
    pub expires_at: i64,
    pub bump: u8,
    pub vault_bump: u8,
}

impl Duel {
    pub const LEN: usize = 8  // discriminator
        + 8   // duel_id
        + 32  // player1
        + 32  // player2
        + 32  // stake_mint
        + 8   // bet_amount
        + 1   // currency
        + 2   // market_id
        + 1   // direction_p1
        + 1   // status
        + 8   // entry_price
        + 8   // exit_price
        + 32  // winner
        + 8   // created_at
        + 8   // started_at
        + 8   // resolved_at
        + 8   // expires_at
        + 1   // bump
        + 1;  // vault_bump
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum DuelStatus {
    Pending,
    Matched,
    Active,
    Resolved,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum Currency {
    Sol,
    Pump,
    Usdc,
}

impl Currency {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Currency::Sol),
            1 => Some(Currency::Pump),
            2 => Some(Currency::Usdc),
            _ => None,
        }
    }

    /// 0.01 units in the currency's smallest denomination.
    pub fn min_bet(&self) -> u64 {
        match self {
            Currency::Sol => 10_000_000,
            Currency::Pump | Currency::Usdc => 10_000,
        }
    }

    /// 100 units in the currency's smallest denomination.
    pub fn max_bet(&self) -> u64 {
        match self {
            Currency::Sol => 100_000_000_000,
            Currency::Pump | Currency::Usdc => 100_000_000,
        }
    }
}

/// Direction that wins for a given entry/exit pair. None on an exact tie,
/// which cancels the duel and refunds both stakes.
pub fn winning_direction(entry_price: u64, exit_price: u64) -> Option<Direction> {
    match exit_price.cmp(&entry_price) {
        std::cmp::Ordering::Greater => Some(Direction::Up),
        std::cmp::Ordering::Less => Some(Direction::Down),
        std::cmp::Ordering::Equal => None,
    }
}

/// Split the gross pot into (winner_payout, platform_fee).
///
/// gross = 2 * bet; fee floors; payout + fee = gross always.
pub fn payout_split(bet_amount: u64, fee_bps: u16) -> Option<(u64, u64)> {
    let gross = bet_amount.checked_mul(2)?;
    let fee = ((gross as u128).checked_mul(fee_bps as u128)? / BPS_DENOMINATOR as u128) as u64;
    let payout = gross.checked_sub(fee)?;
    Some((payout, fee))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_follows_price_sign() {
        assert_eq!(
            winning_direction(100_00000000, 101_00000000),
            Some(Direction::Up)
        );
        assert_eq!(
            winning_direction(100_00000000, 99_99999999),
            Some(Direction::Down)
        );
        assert_eq!(winning_direction(100_00000000, 100_00000000), None);
    }

    #[test]
    fn payout_takes_five_percent() {
        let (payout, fee) = payout_split(10_000_000, 500).unwrap();
        assert_eq!(fee, 1_000_000);
        assert_eq!(payout, 19_000_000);
    }

    #[test]
    fn pot_is_conserved() {
        for bet in [1u64, 10_000, 10_000_000, 99_999_999_999] {
            let (payout, fee) = payout_split(bet, 500).unwrap();
            assert_eq!(payout + fee, 2 * bet);
        }
    }

    #[test]
    fn payout_overflow_rejected() {
        assert!(payout_split(u64::MAX, 500).is_none());
    }

    #[test]
    fn bet_bounds_per_currency() {
        assert_eq!(Currency::Sol.min_bet(), 10_000_000);
        assert_eq!(Currency::Sol.max_bet(), 100_000_000_000);
        assert_eq!(Currency::Usdc.min_bet(), 10_000);
        assert_eq!(Currency::Usdc.max_bet(), 100_000_000);
    }
}
