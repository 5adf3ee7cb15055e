use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::errors::DuelError;
use crate::state::*;

#[derive(Accounts)]
pub struct JoinDuel<'info> {
    #[account(
        mut,
        seeds = [b"duel", duel.duel_id.to_le_bytes().as_ref()],
        bump = duel.bump,
    )]
    pub duel: Account<'info, Duel>,

    #[account(
        mut,
        seeds = [b"duel_vault", duel.duel_id.to_le_bytes().as_ref()],
        bump = duel.vault_bump,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = player2_token_account.mint == duel.stake_mint,
    )]
    pub player2_token_account: Account<'info, TokenAccount>,

    pub player2: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<JoinDuel>, direction: u8) -> Result<()> {
    let direction = Direction::from_u8(direction).ok_or(DuelError::InvalidDirection)?;
    let now = Clock::get()?.unix_timestamp;

    let duel = &mut ctx.accounts.duel;
    require!(duel.status == DuelStatus::Pending, DuelError::DuelNotJoinable);
    require!(now < duel.expires_at, DuelError::DuelExpired);
    require!(
        ctx.accounts.player2.key() != duel.player1,
        DuelError::SelfJoinForbidden
    );
    // Player 2 must take the other side of the bet.
    require!(
        direction == duel.direction_p1.opposite(),
        DuelError::InvalidDirection
    );

    duel.player2 = ctx.accounts.player2.key();
    duel.status = DuelStatus::Matched;

    let bet = duel.bet_amount;
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.player2_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.player2.to_account_info(),
            },
        ),
        bet,
    )?;

    msg!("Player 2 joined duel {}", ctx.accounts.duel.duel_id);

    Ok(())
}
