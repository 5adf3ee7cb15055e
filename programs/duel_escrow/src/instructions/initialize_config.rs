use anchor_lang::prelude::*;

use crate::errors::DuelError;
use crate::state::*;

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = authority,
        space = Config::LEN,
        seeds = [b"config"],
        bump,
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: Destination for platform fees, validated at resolve time
    /// against the token account it owns.
    pub fee_collector: AccountInfo<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeConfig>, fee_bps: u16) -> Result<()> {
    require!(fee_bps as u64 <= BPS_DENOMINATOR, DuelError::InvalidAmount);

    let config = &mut ctx.accounts.config;
    config.authority = ctx.accounts.authority.key();
    config.fee_collector = ctx.accounts.fee_collector.key();
    config.fee_bps = fee_bps;
    config.next_duel_id = 1;
    config.bump = ctx.bumps.config;

    msg!(
        "Escrow config initialized: authority={}, fee_bps={}",
        config.authority,
        fee_bps
    );

    Ok(())
}
