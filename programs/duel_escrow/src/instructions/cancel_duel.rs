use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::errors::DuelError;
use crate::state::*;

#[derive(Accounts)]
pub struct CancelDuel<'info> {
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
        seeds = [b"config"],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        constraint = player1_token_account.mint == duel.stake_mint,
        constraint = player1_token_account.owner == duel.player1,
    )]
    pub player1_token_account: Account<'info, TokenAccount>,

    /// Player 2's refund destination. Ignored while the duel is Pending;
    /// the caller passes player 1's account again in that case.
    #[account(
        mut,
        constraint = player2_token_account.mint == duel.stake_mint,
    )]
    pub player2_token_account: Account<'info, TokenAccount>,

    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<CancelDuel>) -> Result<()> {
    let status = ctx.accounts.duel.status;
    let signer_key = ctx.accounts.signer.key();
    let is_authority = signer_key == ctx.accounts.config.authority;

    match status {
        // Player 1 may abandon their own open duel; the authority cancels
        // on behalf of the expiry sweep.
        DuelStatus::Pending => {
            require!(
                signer_key == ctx.accounts.duel.player1 || is_authority,
                DuelError::Unauthorized
            );
        }
        // Emergency escape once both stakes are in: authority only.
        DuelStatus::Matched | DuelStatus::Active => {
            require!(is_authority, DuelError::Unauthorized);
        }
        DuelStatus::Resolved | DuelStatus::Cancelled => {
            return err!(DuelError::NotCancellable);
        }
    }

    let duel_id = ctx.accounts.duel.duel_id;
    let bet = ctx.accounts.duel.bet_amount;
    let bump = ctx.accounts.duel.bump;
    let id_bytes = duel_id.to_le_bytes();
    let seeds = &[b"duel".as_ref(), id_bytes.as_ref(), &[bump]];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault.to_account_info(),
                to: ctx.accounts.player1_token_account.to_account_info(),
                authority: ctx.accounts.duel.to_account_info(),
            },
            signer_seeds,
        ),
        bet,
    )?;

    if matches!(status, DuelStatus::Matched | DuelStatus::Active) {
        require!(
            ctx.accounts.player2_token_account.owner == ctx.accounts.duel.player2,
            DuelError::Unauthorized
        );
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.player2_token_account.to_account_info(),
                    authority: ctx.accounts.duel.to_account_info(),
                },
                signer_seeds,
            ),
            bet,
        )?;
    }

    let duel = &mut ctx.accounts.duel;
    duel.status = DuelStatus::Cancelled;

    emit!(DuelCancelled { duel_id });

    Ok(())
}

#[event]
pub struct DuelCancelled {
    pub duel_id: u64,
}
