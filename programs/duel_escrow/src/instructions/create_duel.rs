use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::errors::DuelError;
use crate::state::*;

#[derive(Accounts)]
pub struct CreateDuel<'info> {
    /// Hands out sequential duel ids; the claimed id seeds the duel PDA,
    /// so clients derive the address from `next_duel_id` before signing.
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = player1,
        space = Duel::LEN,
        seeds = [b"duel", config.next_duel_id.to_le_bytes().as_ref()],
        bump,
    )]
    pub duel: Account<'info, Duel>,

    /// Escrow vault holding both stakes; the duel PDA is its authority.
    #[account(
        init,
        payer = player1,
        seeds = [b"duel_vault", config.next_duel_id.to_le_bytes().as_ref()],
        bump,
        token::mint = stake_mint,
        token::authority = duel,
    )]
    pub vault: Account<'info, TokenAccount>,

    pub stake_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = player1_token_account.mint == stake_mint.key(),
    )]
    pub player1_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub player1: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<CreateDuel>,
    bet: u64,
    direction: u8,
    market_id: u16,
    currency: u8,
) -> Result<()> {
    let direction = Direction::from_u8(direction).ok_or(DuelError::InvalidDirection)?;
    let currency = Currency::from_u8(currency).ok_or(DuelError::InvalidCurrency)?;
    require!(
        bet >= currency.min_bet() && bet <= currency.max_bet(),
        DuelError::InvalidAmount
    );

    let now = Clock::get()?.unix_timestamp;
    let config = &mut ctx.accounts.config;
    let duel_id = config.next_duel_id;
    config.next_duel_id = duel_id.checked_add(1).ok_or(DuelError::MathOverflow)?;

    let duel = &mut ctx.accounts.duel;
    duel.duel_id = duel_id;
    duel.player1 = ctx.accounts.player1.key();
    duel.player2 = Pubkey::default();
    duel.stake_mint = ctx.accounts.stake_mint.key();
    duel.bet_amount = bet;
    duel.currency = currency;
    duel.market_id = market_id;
    duel.direction_p1 = direction;
    duel.status = DuelStatus::Pending;
    duel.entry_price = 0;
    duel.exit_price = 0;
    duel.winner = Pubkey::default();
    duel.created_at = now;
    duel.started_at = 0;
    duel.resolved_at = 0;
    duel.expires_at = now + PENDING_TTL;
    duel.bump = ctx.bumps.duel;
    duel.vault_bump = ctx.bumps.vault;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.player1_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.player1.to_account_info(),
            },
        ),
        bet,
    )?;

    msg!(
        "Duel created: id={}, bet={}, market={}, direction={:?}",
        duel_id,
        bet,
        market_id,
        direction
    );

    Ok(())
}
