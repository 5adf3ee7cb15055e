use anchor_lang::prelude::*;

pub mod errors;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("9fDpLYmAR1WtaVwSczxz1BZqQGiSRavT6kAMLSCAh1dF");

#[program]
pub mod duel_escrow {
    use super::*;

    /// One-time setup of the resolver authority and fee collector.
    pub fn initialize_config(ctx: Context<InitializeConfig>, fee_bps: u16) -> Result<()> {
        instructions::initialize_config::handler(ctx, fee_bps)
    }

    /// Open a duel as player 1, staking `bet` into the escrow vault.
    ///
    /// The duel claims the config's `next_duel_id` and waits in Pending for
    /// an opponent until `expires_at` (created_at + PENDING_TTL); after
    /// that only cancellation is possible.
    pub fn create_duel(
        ctx: Context<CreateDuel>,
        bet: u64,
        direction: u8,
        market_id: u16,
        currency: u8,
    ) -> Result<()> {
        instructions::create_duel::handler(ctx, bet, direction, market_id, currency)
    }

    /// Join a Pending duel as player 2 on the opposite direction.
    pub fn join_duel(ctx: Context<JoinDuel>, direction: u8) -> Result<()> {
        instructions::join_duel::handler(ctx, direction)
    }

    /// Record the entry price and arm the countdown (resolver authority only).
    ///
    /// On-chain the duel goes straight to Active with
    /// `started_at = now + COUNTDOWN`; clients treat `now < started_at`
    /// as the Starting countdown window.
    pub fn start_duel(ctx: Context<StartDuel>, entry_price: u64) -> Result<()> {
        instructions::start_duel::handler(ctx, entry_price)
    }

    /// Settle an Active duel once DUEL_DURATION has elapsed.
    ///
    /// Winner takes `2 * bet` minus the platform fee; an exact tie cancels
    /// the duel and refunds both stakes with no fee taken.
    pub fn resolve_duel(ctx: Context<ResolveDuel>, exit_price: u64) -> Result<()> {
        instructions::resolve_duel::handler(ctx, exit_price)
    }

    /// Cancel a duel and refund deposited stakes.
    ///
    /// Player 1 may cancel their own Pending duel; the resolver authority
    /// may cancel from Pending (expiry sweep) or, as an emergency escape,
    /// from Matched/Active.
    pub fn cancel_duel(ctx: Context<CancelDuel>) -> Result<()> {
        instructions::cancel_duel::handler(ctx)
    }
}
