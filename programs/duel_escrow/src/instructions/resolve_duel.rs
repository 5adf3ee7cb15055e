use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::errors::DuelError;
use crate::state::*;

#[derive(Accounts)]
pub struct ResolveDuel<'info> {
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

    #[account(
        mut,
        constraint = player2_token_account.mint == duel.stake_mint,
        constraint = player2_token_account.owner == duel.player2,
    )]
    pub player2_token_account: Account<'info, TokenAccount>,

    /// Receives the platform fee.
    #[account(
        mut,
        constraint = fee_collector_token_account.mint == duel.stake_mint,
        constraint = fee_collector_token_account.owner == config.fee_collector,
    )]
    pub fee_collector_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = authority.key() == config.authority @ DuelError::Unauthorized,
    )]
    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ResolveDuel>, exit_price: u64) -> Result<()> {
    require!(exit_price > 0, DuelError::InvalidPrice);

    let now = Clock::get()?.unix_timestamp;
    {
        let duel = &ctx.accounts.duel;
        require!(duel.status == DuelStatus::Active, DuelError::WrongState);
        require!(now >= duel.started_at + DUEL_DURATION, DuelError::TooEarly);
    }

    let duel_id = ctx.accounts.duel.duel_id;
    let bet = ctx.accounts.duel.bet_amount;
    let entry_price = ctx.accounts.duel.entry_price;
    let bump = ctx.accounts.duel.bump;

    let id_bytes = duel_id.to_le_bytes();
    let seeds = &[b"duel".as_ref(), id_bytes.as_ref(), &[bump]];
    let signer_seeds = &[&seeds[..]];

    match winning_direction(entry_price, exit_price) {
        Some(side) => {
            let (payout, fee) =
                payout_split(bet, ctx.accounts.config.fee_bps).ok_or(DuelError::MathOverflow)?;

            let (winner_key, winner_account) = if side == ctx.accounts.duel.direction_p1 {
                (
                    ctx.accounts.duel.player1,
                    ctx.accounts.player1_token_account.to_account_info(),
                )
            } else {
                (
                    ctx.accounts.duel.player2,
                    ctx.accounts.player2_token_account.to_account_info(),
                )
            };

            token::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.vault.to_account_info(),
                        to: winner_account,
                        authority: ctx.accounts.duel.to_account_info(),
                    },
                    signer_seeds,
                ),
                payout,
            )?;

            if fee > 0 {
                token::transfer(
                    CpiContext::new_with_signer(
                        ctx.accounts.token_program.to_account_info(),
                        Transfer {
                            from: ctx.accounts.vault.to_account_info(),
                            to: ctx.accounts.fee_collector_token_account.to_account_info(),
                            authority: ctx.accounts.duel.to_account_info(),
                        },
                        signer_seeds,
                    ),
                    fee,
                )?;
            }

            let duel = &mut ctx.accounts.duel;
            duel.exit_price = exit_price;
            duel.winner = winner_key;
            duel.status = DuelStatus::Resolved;
            duel.resolved_at = now;

            emit!(DuelResolved {
                duel_id,
                exit_price,
                winner: winner_key,
                payout,
                fee,
            });
        }
        None => {
            // Exact tie: both stakes go back, no fee is taken.
            for account in [
                ctx.accounts.player1_token_account.to_account_info(),
                ctx.accounts.player2_token_account.to_account_info(),
            ] {
                token::transfer(
                    CpiContext::new_with_signer(
                        ctx.accounts.token_program.to_account_info(),
                        Transfer {
                            from: ctx.accounts.vault.to_account_info(),
                            to: account,
                            authority: ctx.accounts.duel.to_account_info(),
                        },
                        signer_seeds,
                    ),
                    bet,
                )?;
            }

            let duel = &mut ctx.accounts.duel;
            duel.exit_price = exit_price;
            duel.status = DuelStatus::Cancelled;
            duel.resolved_at = now;

            emit!(DuelTied { duel_id, exit_price });
        }
    }

    Ok(())
}

#[event]
pub struct DuelResolved {
    pub duel_id: u64,
    pub exit_price: u64,
    pub winner: Pubkey,
    pub payout: u64,
    pub fee: u64,
}

#[event]
pub struct DuelTied {
    pub duel_id: u64,
    pub exit_price: u64,
}
