use anchor_lang::prelude::*;

pub mod errors;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("2aMcirYcF9W8aTFem6qe8QtvfQ22SLY6KUe6yUQbqfHk");

#[program]
pub mod outcome_amm {
    use super::*;

    /// Create a new AMM pool for a binary market.
    ///
    /// Allocates the pool PDA and its two token vaults, then seeds both
    /// vaults from the authority's token accounts. The seeded amounts are
    /// recorded immutably as `base_yes_liquidity` / `base_no_liquidity` so
    /// off-chain consumers can normalize prices against unequal seeding.
    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        fee_bps: u16,
        initial_yes: u64,
        initial_no: u64,
    ) -> Result<()> {
        instructions::initialize_pool::handler(ctx, fee_bps, initial_yes, initial_no)
    }

    /// Swap against the constant-product curve, fee on input.
    ///
    /// trade_type: 0 = BuyYes (pay NO, receive YES), 1 = BuyNo (symmetric).
    /// The full input including the fee is credited to the input reserve, so
    /// `yes_reserve * no_reserve` grows monotonically as fees accrue.
    pub fn swap(
        ctx: Context<Swap>,
        trade_type: u8,
        input_amount: u64,
        minimum_output: u64,
    ) -> Result<()> {
        instructions::swap::handler(ctx, trade_type, input_amount, minimum_output)
    }

    /// Drain both vaults back to the authority and close trading.
    pub fn close_pool(ctx: Context<ClosePool>) -> Result<()> {
        instructions::close_pool::handler(ctx)
    }
}
