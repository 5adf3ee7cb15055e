use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::errors::AmmError;
use crate::state::*;

#[derive(Accounts)]
pub struct InitializePool<'info> {
    #[account(
        init,
        payer = authority,
        space = Pool::LEN,
        seeds = [
            b"amm_pool",
            authority.key().as_ref(),
            yes_mint.key().as_ref(),
            no_mint.key().as_ref(),
        ],
        bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        init,
        payer = authority,
        seeds = [
            b"yes_vault",
            authority.key().as_ref(),
            yes_mint.key().as_ref(),
            no_mint.key().as_ref(),
        ],
        bump,
        token::mint = yes_mint,
        token::authority = pool,
    )]
    pub yes_vault: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = authority,
        seeds = [
            b"no_vault",
            authority.key().as_ref(),
            yes_mint.key().as_ref(),
            no_mint.key().as_ref(),
        ],
        bump,
        token::mint = no_mint,
        token::authority = pool,
    )]
    pub no_vault: Account<'info, TokenAccount>,

    pub yes_mint: Account<'info, Mint>,
    pub no_mint: Account<'info, Mint>,

    /// Authority's YES token account, source of the seeded YES reserve.
    #[account(
        mut,
        constraint = authority_yes_account.mint == yes_mint.key(),
    )]
    pub authority_yes_account: Account<'info, TokenAccount>,

    /// Authority's NO token account, source of the seeded NO reserve.
    #[account(
        mut,
        constraint = authority_no_account.mint == no_mint.key(),
    )]
    pub authority_no_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializePool>,
    fee_bps: u16,
    initial_yes: u64,
    initial_no: u64,
) -> Result<()> {
    require!(fee_bps <= MAX_FEE_BPS, AmmError::InvalidFee);
    require!(initial_yes > 0, AmmError::InvalidAmount);
    require!(initial_no > 0, AmmError::InvalidAmount);

    let pool = &mut ctx.accounts.pool;
    pool.authority = ctx.accounts.authority.key();
    pool.yes_mint = ctx.accounts.yes_mint.key();
    pool.no_mint = ctx.accounts.no_mint.key();
    pool.yes_reserve = initial_yes;
    pool.no_reserve = initial_no;
    pool.base_yes_liquidity = initial_yes;
    pool.base_no_liquidity = initial_no;
    pool.fee_bps = fee_bps;
    pool.total_liquidity = integer_sqrt(
        (initial_yes as u128)
            .checked_mul(initial_no as u128)
            .ok_or(AmmError::MathOverflow)?,
    );
    pool.bump = ctx.bumps.pool;
    pool.status = PoolStatus::Active;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.authority_yes_account.to_account_info(),
                to: ctx.accounts.yes_vault.to_account_info(),
                authority: ctx.accounts.authority.to_account_info(),
            },
        ),
        initial_yes,
    )?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.authority_no_account.to_account_info(),
                to: ctx.accounts.no_vault.to_account_info(),
                authority: ctx.accounts.authority.to_account_info(),
            },
        ),
        initial_no,
    )?;

    emit!(PoolInitialized {
        pool: ctx.accounts.pool.key(),
        authority: ctx.accounts.authority.key(),
        yes_mint: ctx.accounts.yes_mint.key(),
        no_mint: ctx.accounts.no_mint.key(),
        yes_reserve: initial_yes,
        no_reserve: initial_no,
        fee_bps,
    });

    Ok(())
}

#[event]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub yes_mint: Pubkey,
    pub no_mint: Pubkey,
    pub yes_reserve: u64,
    pub no_reserve: u64,
    pub fee_bps: u16,
}
