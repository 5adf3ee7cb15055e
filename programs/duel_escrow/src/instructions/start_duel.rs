use anchor_lang::prelude::*;

use crate::errors::DuelError;
use crate::state::*;

#[derive(Accounts)]
pub struct StartDuel<'info> {
    #[account(
        mut,
        seeds = [b"duel", duel.duel_id.to_le_bytes().as_ref()],
        bump = duel.bump,
    )]
    pub duel: Account<'info, Duel>,

    #[account(
        seeds = [b"config"],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        constraint = authority.key() == config.authority @ DuelError::Unauthorized,
    )]
    pub authority: Signer<'info>,
}

pub fn handler(ctx: Context<StartDuel>, entry_price: u64) -> Result<()> {
    require!(entry_price > 0, DuelError::InvalidPrice);

    let duel = &mut ctx.accounts.duel;
    require!(duel.status == DuelStatus::Matched, DuelError::WrongState);

    let now = Clock::get()?.unix_timestamp;
    duel.entry_price = entry_price;
    // The countdown lives in started_at: the duel is live once the clock
    // passes it, and due for resolution DUEL_DURATION after it.
    duel.started_at = now + COUNTDOWN;
    duel.status = DuelStatus::Active;

    emit!(DuelStarted {
        duel_id: duel.duel_id,
        entry_price,
        started_at: duel.started_at,
    });

    Ok(())
}

#[event]
pub struct DuelStarted {
    pub duel_id: u64,
    pub entry_price: u64,
    pub started_at: i64,
}
