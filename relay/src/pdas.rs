use solana_sdk::pubkey::Pubkey;

/// Pool PDA: ["amm_pool", authority, yes_mint, no_mint]
pub fn pool_pda(
  program_id: &Pubkey,
  authority: &Pubkey,
  yes_mint: &Pubkey,
  no_mint: &Pubkey,
) -> (Pubkey, u8) {
  Pubkey::find_program_address(
    &[
      b"amm_pool",
      authority.as_ref(),
      yes_mint.as_ref(),
      no_mint.as_ref(),
    ],
    program_id,
  )
}

/// YES vault PDA: ["yes_vault", authority, yes_mint, no_mint]
pub fn yes_vault_pda(
  program_id: &Pubkey,
  authority: &Pubkey,
  yes_mint: &Pubkey,
  no_mint: &Pubkey,
) -> (Pubkey, u8) {
  Pubkey::find_program_address(
    &[
      b"yes_vault",
      authority.as_ref(),
      yes_mint.as_ref(),
      no_mint.as_ref(),
    ],
    program_id,
  )
}

/// NO vault PDA: ["no_vault", authority, yes_mint, no_mint]
pub fn no_vault_pda(
  program_id: &Pubkey,
  authority: &Pubkey,
  yes_mint: &Pubkey,
  no_mint: &Pubkey,
) -> (Pubkey, u8) {
  Pubkey::find_program_address(
    &[
      b"no_vault",
      authority.as_ref(),
      yes_mint.as_ref(),
      no_mint.as_ref(),
    ],
    program_id,
  )
}

/// Duel PDA: ["duel", duel_id.to_le_bytes()]
pub fn duel_pda(program_id: &Pubkey, duel_id: u64) -> (Pubkey, u8) {
  Pubkey::find_program_address(&[b"duel", duel_id.to_le_bytes().as_ref()], program_id)
}

/// Duel stake vault PDA: ["duel_vault", duel_id.to_le_bytes()]
pub fn duel_vault_pda(program_id: &Pubkey, duel_id: u64) -> (Pubkey, u8) {
  Pubkey::find_program_address(&[b"duel_vault", duel_id.to_le_bytes().as_ref()], program_id)
}

/// Escrow config PDA: ["config"]
pub fn config_pda(program_id: &Pubkey) -> (Pubkey, u8) {
  Pubkey::find_program_address(&[b"config"], program_id)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duel_seeds_are_le_encoded() {
    let program_id = duel_escrow::id();
    let (a, _) = duel_pda(&program_id, 1);
    let (b, _) = Pubkey::find_program_address(
      &[b"duel", &[1, 0, 0, 0, 0, 0, 0, 0]],
      &program_id,
    );
    assert_eq!(a, b);
  }

  #[test]
  fn distinct_duels_get_distinct_vaults() {
    let program_id = duel_escrow::id();
    let (v1, _) = duel_vault_pda(&program_id, 7);
    let (v2, _) = duel_vault_pda(&program_id, 8);
    assert_ne!(v1, v2);
  }
}
