use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::errors::AmmError;
use crate::state::*;

pub const TRADE_BUY_YES: u8 = 0;
pub const TRADE_BUY_NO: u8 = 1;

#[derive(Accounts)]
pub struct Swap<'info> {
    #[account(
        mut,
        seeds = [
            b"amm_pool",
            pool.authority.as_ref(),
            pool.yes_mint.as_ref(),
            pool.no_mint.as_ref(),
        ],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        seeds = [
            b"yes_vault",
            pool.authority.as_ref(),
            pool.yes_mint.as_ref(),
            pool.no_mint.as_ref(),
        ],
        bump,
    )]
    pub yes_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [
            b"no_vault",
            pool.authority.as_ref(),
            pool.yes_mint.as_ref(),
            pool.no_mint.as_ref(),
        ],
        bump,
    )]
    pub no_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_yes_account.mint == pool.yes_mint,
    )]
    pub user_yes_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_no_account.mint == pool.no_mint,
    )]
    pub user_no_account: Account<'info, TokenAccount>,

    pub user: Signer<'info>,
    pub token_program: Program<'info, Token>,
}

pub fn handler(
    ctx: Context<Swap>,
    trade_type: u8,
    input_amount: u64,
    minimum_output: u64,
) -> Result<()> {
    require!(input_amount > 0, AmmError::InvalidAmount);
    require!(
        trade_type == TRADE_BUY_YES || trade_type == TRADE_BUY_NO,
        AmmError::InvalidTradeType
    );
    require!(
        ctx.accounts.pool.status == PoolStatus::Active,
        AmmError::PoolNotActive
    );

    let yes_reserve = ctx.accounts.pool.yes_reserve;
    let no_reserve = ctx.accounts.pool.no_reserve;
    let fee_bps = ctx.accounts.pool.fee_bps;
    let authority_key = ctx.accounts.pool.authority;
    let yes_mint_key = ctx.accounts.pool.yes_mint;
    let no_mint_key = ctx.accounts.pool.no_mint;
    let pool_bump = ctx.accounts.pool.bump;

    // BuyYes: user pays NO, receives YES. BuyNo is the mirror.
    let (input_reserve, output_reserve) = match trade_type {
        TRADE_BUY_YES => (no_reserve, yes_reserve),
        _ => (yes_reserve, no_reserve),
    };

    let quote = quote_swap(input_amount, fee_bps, input_reserve, output_reserve)
        .ok_or(AmmError::MathOverflow)?;

    // A floored-to-zero output can never satisfy minimum_output >= 1.
    require!(quote.output >= 1, AmmError::SlippageExceeded);
    require!(quote.output >= minimum_output, AmmError::SlippageExceeded);
    // Neither reserve may be emptied while the pool is active.
    require!(quote.output < output_reserve, AmmError::InsufficientLiquidity);

    let (user_send, vault_receive, vault_send, user_receive) = match trade_type {
        TRADE_BUY_YES => (
            ctx.accounts.user_no_account.to_account_info(),
            ctx.accounts.no_vault.to_account_info(),
            ctx.accounts.yes_vault.to_account_info(),
            ctx.accounts.user_yes_account.to_account_info(),
        ),
        _ => (
            ctx.accounts.user_yes_account.to_account_info(),
            ctx.accounts.yes_vault.to_account_info(),
            ctx.accounts.no_vault.to_account_info(),
            ctx.accounts.user_no_account.to_account_info(),
        ),
    };

    // User pays the full input, fee included, into the input vault.
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: user_send,
                to: vault_receive,
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        input_amount,
    )?;

    let seeds = &[
        b"amm_pool".as_ref(),
        authority_key.as_ref(),
        yes_mint_key.as_ref(),
        no_mint_key.as_ref(),
        &[pool_bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: vault_send,
                to: user_receive,
                authority: ctx.accounts.pool.to_account_info(),
            },
            signer_seeds,
        ),
        quote.output,
    )?;

    // The fee stays inside the pool: the input reserve absorbs the whole
    // input_amount, which is what makes k non-decreasing across swaps.
    let pool = &mut ctx.accounts.pool;
    match trade_type {
        TRADE_BUY_YES => {
            pool.no_reserve = no_reserve
                .checked_add(input_amount)
                .ok_or(AmmError::MathOverflow)?;
            pool.yes_reserve = yes_reserve
                .checked_sub(quote.output)
                .ok_or(AmmError::MathOverflow)?;
        }
        _ => {
            pool.yes_reserve = yes_reserve
                .checked_add(input_amount)
                .ok_or(AmmError::MathOverflow)?;
            pool.no_reserve = no_reserve
                .checked_sub(quote.output)
                .ok_or(AmmError::MathOverflow)?;
        }
    }
    pool.total_liquidity = integer_sqrt(
        (pool.yes_reserve as u128)
            .checked_mul(pool.no_reserve as u128)
            .ok_or(AmmError::MathOverflow)?,
    );

    emit!(SwapExecuted {
        pool: ctx.accounts.pool.key(),
        user: ctx.accounts.user.key(),
        trade_type,
        input_amount,
        output_amount: quote.output,
        fee_amount: quote.fee,
        yes_reserve: ctx.accounts.pool.yes_reserve,
        no_reserve: ctx.accounts.pool.no_reserve,
    });

    Ok(())
}

#[event]
pub struct SwapExecuted {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub trade_type: u8,
    pub input_amount: u64,
    pub output_amount: u64,
    pub fee_amount: u64,
    pub yes_reserve: u64,
    pub no_reserve: u64,
}
