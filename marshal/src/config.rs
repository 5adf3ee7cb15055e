use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

use relay::{read_keypair_from_env, read_pubkey_from_env};
use ticker::DEFAULT_BASE_URL;

/// Coordinator configuration, read once at startup. Every field except the
/// price API base is required; a missing variable aborts the process.
pub struct MarshalConfig {
  pub signer: Keypair,
  pub amm_program: Pubkey,
  pub escrow_program: Pubkey,
  pub fee_collector: Pubkey,
  pub platform_fee_percent: f64,
  pub rpc_url: String,
  pub network: String,
  pub database_url: String,
  pub price_api_url: String,
}

impl MarshalConfig {
  pub fn read() -> anyhow::Result<Self> {
    Ok(Self {
      signer: read_keypair_from_env("SERVER_WALLET_PRIVATE_KEY")?,
      amm_program: read_pubkey_from_env("PROGRAM_ID")?,
      escrow_program: read_pubkey_from_env("ESCROW_PROGRAM_ID")?,
      fee_collector: read_pubkey_from_env("PLATFORM_WALLET_PUBLIC_KEY")?,
      platform_fee_percent: std::env::var("PLATFORM_FEE_PERCENT")?.parse()?,
      rpc_url: std::env::var("SOLANA_RPC_URL")?,
      network: std::env::var("SOLANA_NETWORK")?,
      database_url: std::env::var("DATABASE_URL")?,
      price_api_url: std::env::var("PRICE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
    })
  }
}
