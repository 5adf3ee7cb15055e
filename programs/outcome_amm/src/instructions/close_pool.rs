use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::errors::AmmError;
use crate::state::*;

#[derive(Accounts)]
pub struct ClosePool<'info> {
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

    /// Destination for the drained YES reserve.
    #[account(
        mut,
        constraint = authority_yes_account.mint == pool.yes_mint,
    )]
    pub authority_yes_account: Account<'info, TokenAccount>,

    /// Destination for the drained NO reserve.
    #[account(
        mut,
        constraint = authority_no_account.mint == pool.no_mint,
    )]
    pub authority_no_account: Account<'info, TokenAccount>,

    pub authority: Signer<'info>,
    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ClosePool>) -> Result<()> {
    require!(
        ctx.accounts.pool.status == PoolStatus::Active,
        AmmError::PoolAlreadyClosed
    );
    require_eq!(
        ctx.accounts.authority.key(),
        ctx.accounts.pool.authority,
        AmmError::Unauthorized
    );

    let authority_key = ctx.accounts.pool.authority;
    let yes_mint_key = ctx.accounts.pool.yes_mint;
    let no_mint_key = ctx.accounts.pool.no_mint;
    let pool_bump = ctx.accounts.pool.bump;

    let seeds = &[
        b"amm_pool".as_ref(),
        authority_key.as_ref(),
        yes_mint_key.as_ref(),
        no_mint_key.as_ref(),
        &[pool_bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let yes_balance = ctx.accounts.yes_vault.amount;
    if yes_balance > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.yes_vault.to_account_info(),
                    to: ctx.accounts.authority_yes_account.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer_seeds,
            ),
            yes_balance,
        )?;
    }

    let no_balance = ctx.accounts.no_vault.amount;
    if no_balance > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.no_vault.to_account_info(),
                    to: ctx.accounts.authority_no_account.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer_seeds,
            ),
            no_balance,
        )?;
    }

    let pool = &mut ctx.accounts.pool;
    pool.status = PoolStatus::Closed;
    pool.yes_reserve = 0;
    pool.no_reserve = 0;
    pool.total_liquidity = 0;

    emit!(PoolClosed {
        pool: ctx.accounts.pool.key(),
        authority: ctx.accounts.authority.key(),
    });

    Ok(())
}

#[event]
pub struct PoolClosed {
    pub pool: Pubkey,
    pub authority: Pubkey,
}
