use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use std::str::FromStr;

/// Read a keypair from an env var holding a JSON byte array
/// (`[12,34,...]`, the solana-keygen file format).
pub fn read_keypair_from_env(env_var: &str) -> anyhow::Result<Keypair> {
  let raw = std::env::var(env_var)
    .map_err(|e| anyhow::anyhow!("Failed to get {} from env: {}", env_var, e))?;
  let bytes: Vec<u8> = raw
    .trim_matches(|c| c == '[' || c == ']')
    .split(',')
    .filter_map(|s| s.trim().parse().ok())
    .collect();
  Ok(Keypair::from_bytes(&bytes)?)
}

pub fn read_pubkey_from_env(env_var: &str) -> anyhow::Result<Pubkey> {
  let raw = std::env::var(env_var)
    .map_err(|e| anyhow::anyhow!("Failed to get {} from env: {}", env_var, e))?;
  Ok(Pubkey::from_str(raw.trim())?)
}
