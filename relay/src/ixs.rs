use anchor_lang::{InstructionData, ToAccountMetas};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::pdas::*;

/// One-time escrow setup: resolver authority + fee collector.
pub fn initialize_config_ix(
  program_id: &Pubkey,
  authority: &Pubkey,
  fee_collector: &Pubkey,
  fee_bps: u16,
) -> Instruction {
  let (config, _) = config_pda(program_id);
  Instruction {
    program_id: *program_id,
    accounts: duel_escrow::accounts::InitializeConfig {
      config,
      authority: *authority,
      fee_collector: *fee_collector,
      system_program: solana_sdk::system_program::id(),
    }
    .to_account_metas(None),
    data: duel_escrow::instruction::InitializeConfig { fee_bps }.data(),
  }
}

/// `next_duel_id` is read off the config account before signing; the duel
/// and vault PDAs are derived from it, the instruction data excludes it.
#[allow(clippy::too_many_arguments)]
pub fn create_duel_ix(
  program_id: &Pubkey,
  next_duel_id: u64,
  player1: &Pubkey,
  stake_mint: &Pubkey,
  bet: u64,
  direction: u8,
  market_id: u16,
  currency: u8,
) -> Instruction {
  let (config, _) = config_pda(program_id);
  let (duel, _) = duel_pda(program_id, next_duel_id);
  let (vault, _) = duel_vault_pda(program_id, next_duel_id);
  Instruction {
    program_id: *program_id,
    accounts: duel_escrow::accounts::CreateDuel {
      config,
      duel,
      vault,
      stake_mint: *stake_mint,
      player1_token_account: get_associated_token_address(player1, stake_mint),
      player1: *player1,
      token_program: spl_token::id(),
      system_program: solana_sdk::system_program::id(),
    }
    .to_account_metas(None),
    data: duel_escrow::instruction::CreateDuel {
      bet,
      direction,
      market_id,
      currency,
    }
    .data(),
  }
}

pub fn join_duel_ix(
  program_id: &Pubkey,
  duel_id: u64,
  player2: &Pubkey,
  stake_mint: &Pubkey,
  direction: u8,
) -> Instruction {
  let (duel, _) = duel_pda(program_id, duel_id);
  let (vault, _) = duel_vault_pda(program_id, duel_id);
  Instruction {
    program_id: *program_id,
    accounts: duel_escrow::accounts::JoinDuel {
      duel,
      vault,
      player2_token_account: get_associated_token_address(player2, stake_mint),
      player2: *player2,
      token_program: spl_token::id(),
    }
    .to_account_metas(None),
    data: duel_escrow::instruction::JoinDuel { direction }.data(),
  }
}

pub fn start_duel_ix(
  program_id: &Pubkey,
  duel_id: u64,
  authority: &Pubkey,
  entry_price: u64,
) -> Instruction {
  let (duel, _) = duel_pda(program_id, duel_id);
  let (config, _) = config_pda(program_id);
  Instruction {
    program_id: *program_id,
    accounts: duel_escrow::accounts::StartDuel {
      duel,
      config,
      authority: *authority,
    }
    .to_account_metas(None),
    data: duel_escrow::instruction::StartDuel { entry_price }.data(),
  }
}

#[allow(clippy::too_many_arguments)]
pub fn resolve_duel_ix(
  program_id: &Pubkey,
  duel_id: u64,
  authority: &Pubkey,
  player1: &Pubkey,
  player2: &Pubkey,
  stake_mint: &Pubkey,
  fee_collector: &Pubkey,
  exit_price: u64,
) -> Instruction {
  let (duel, _) = duel_pda(program_id, duel_id);
  let (vault, _) = duel_vault_pda(program_id, duel_id);
  let (config, _) = config_pda(program_id);
  Instruction {
    program_id: *program_id,
    accounts: duel_escrow::accounts::ResolveDuel {
      duel,
      vault,
      config,
      player1_token_account: get_associated_token_address(player1, stake_mint),
      player2_token_account: get_associated_token_address(player2, stake_mint),
      fee_collector_token_account: get_associated_token_address(fee_collector, stake_mint),
      authority: *authority,
      token_program: spl_token::id(),
    }
    .to_account_metas(None),
    data: duel_escrow::instruction::ResolveDuel { exit_price }.data(),
  }
}

/// Cancel refunds player 1 always and player 2 only once matched; for a
/// Pending duel `player2` should be player 1's wallet again.
pub fn cancel_duel_ix(
  program_id: &Pubkey,
  duel_id: u64,
  signer: &Pubkey,
  player1: &Pubkey,
  player2: &Pubkey,
  stake_mint: &Pubkey,
) -> Instruction {
  let (duel, _) = duel_pda(program_id, duel_id);
  let (vault, _) = duel_vault_pda(program_id, duel_id);
  let (config, _) = config_pda(program_id);
  Instruction {
    program_id: *program_id,
    accounts: duel_escrow::accounts::CancelDuel {
      duel,
      vault,
      config,
      player1_token_account: get_associated_token_address(player1, stake_mint),
      player2_token_account: get_associated_token_address(player2, stake_mint),
      signer: *signer,
      token_program: spl_token::id(),
    }
    .to_account_metas(None),
    data: duel_escrow::instruction::CancelDuel {}.data(),
  }
}

pub fn swap_ix(
  program_id: &Pubkey,
  pool_authority: &Pubkey,
  yes_mint: &Pubkey,
  no_mint: &Pubkey,
  user: &Pubkey,
  trade_type: u8,
  input_amount: u64,
  minimum_output: u64,
) -> Instruction {
  let (pool, _) = pool_pda(program_id, pool_authority, yes_mint, no_mint);
  let (yes_vault, _) = yes_vault_pda(program_id, pool_authority, yes_mint, no_mint);
  let (no_vault, _) = no_vault_pda(program_id, pool_authority, yes_mint, no_mint);
  Instruction {
    program_id: *program_id,
    accounts: outcome_amm::accounts::Swap {
      pool,
      yes_vault,
      no_vault,
      user_yes_account: get_associated_token_address(user, yes_mint),
      user_no_account: get_associated_token_address(user, no_mint),
      user: *user,
      token_program: spl_token::id(),
    }
    .to_account_metas(None),
    data: outcome_amm::instruction::Swap {
      trade_type,
      input_amount,
      minimum_output,
    }
    .data(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use anchor_lang::Discriminator;
  use solana_sdk::hash::hash;
  use solana_sdk::signature::{Keypair, Signer};

  fn anchor_discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("global:{}", name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest.to_bytes()[..8]);
    out
  }

  #[test]
  fn discriminators_are_sha256_derived() {
    // The wire format pins each discriminator to sha256("global:<name>")[..8].
    assert_eq!(
      duel_escrow::instruction::ResolveDuel::DISCRIMINATOR,
      anchor_discriminator("resolve_duel")
    );
    assert_eq!(
      duel_escrow::instruction::CreateDuel::DISCRIMINATOR,
      anchor_discriminator("create_duel")
    );
    assert_eq!(
      outcome_amm::instruction::Swap::DISCRIMINATOR,
      anchor_discriminator("swap")
    );
  }

  #[test]
  fn create_duel_wire_layout() {
    // discriminator, then bet u64 | direction u8 | market_id u16 | currency u8,
    // all little-endian
    let data = duel_escrow::instruction::CreateDuel {
      bet: 10_000_000,
      direction: 0,
      market_id: 1,
      currency: 2,
    }
    .data();
    assert_eq!(data.len(), 8 + 8 + 1 + 2 + 1);
    assert_eq!(&data[8..16], &10_000_000u64.to_le_bytes());
    assert_eq!(data[16], 0);
    assert_eq!(&data[17..19], &1u16.to_le_bytes());
    assert_eq!(data[19], 2);
  }

  #[test]
  fn swap_args_encode_little_endian() {
    let data = outcome_amm::instruction::Swap {
      trade_type: 1,
      input_amount: 0x0102030405060708,
      minimum_output: 1,
    }
    .data();
    assert_eq!(data.len(), 8 + 1 + 8 + 8);
    assert_eq!(data[8], 1);
    assert_eq!(&data[9..17], &[8, 7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(&data[17..25], &[1, 0, 0, 0, 0, 0, 0, 0]);
  }

  #[test]
  fn resolve_routes_payouts_through_atas() {
    let program_id = duel_escrow::id();
    let authority = Keypair::new().pubkey();
    let player1 = Keypair::new().pubkey();
    let player2 = Keypair::new().pubkey();
    let mint = Keypair::new().pubkey();
    let collector = Keypair::new().pubkey();
    let ix = resolve_duel_ix(
      &program_id,
      9,
      &authority,
      &player1,
      &player2,
      &mint,
      &collector,
      101_00000000,
    );
    let p1_ata = get_associated_token_address(&player1, &mint);
    let fee_ata = get_associated_token_address(&collector, &mint);
    assert!(ix.accounts.iter().any(|m| m.pubkey == p1_ata && m.is_writable));
    assert!(ix.accounts.iter().any(|m| m.pubkey == fee_ata && m.is_writable));
    assert_eq!(
      &ix.data[..8],
      &duel_escrow::instruction::ResolveDuel::DISCRIMINATOR
    );
    assert_eq!(&ix.data[8..16], &101_00000000u64.to_le_bytes());
  }

  #[test]
  fn start_duel_targets_the_duel_pda() {
    let authority = Keypair::new().pubkey();
    let program_id = duel_escrow::id();
    let ix = start_duel_ix(&program_id, 42, &authority, 100_00000000);
    let (duel, _) = duel_pda(&program_id, 42);
    assert_eq!(ix.program_id, program_id);
    assert_eq!(ix.accounts[0].pubkey, duel);
    assert!(ix.accounts.iter().any(|m| m.pubkey == authority && m.is_signer));
  }
}
