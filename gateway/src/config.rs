use solana_sdk::pubkey::Pubkey;

use relay::read_pubkey_from_env;
use ticker::DEFAULT_BASE_URL;

/// Gateway configuration, read once at startup. Missing required
/// variables abort the process before the listener binds.
pub struct GatewayConfig {
  pub amm_program: Pubkey,
  pub escrow_program: Pubkey,
  pub fee_collector: Pubkey,
  pub platform_fee_percent: f64,
  pub rpc_url: String,
  pub network: String,
  pub database_url: String,
  pub jwt_secret: String,
  pub bind_addr: String,
  pub price_api_url: String,
}

impl GatewayConfig {
  pub fn read() -> anyhow::Result<Self> {
    // The server wallet is not used for signing here, but a gateway
    // deployed without it is misconfigured; fail fast like the resolver.
    relay::read_keypair_from_env("SERVER_WALLET_PRIVATE_KEY")?;
    Ok(Self {
      amm_program: read_pubkey_from_env("PROGRAM_ID")?,
      escrow_program: read_pubkey_from_env("ESCROW_PROGRAM_ID")?,
      fee_collector: read_pubkey_from_env("PLATFORM_WALLET_PUBLIC_KEY")?,
      platform_fee_percent: std::env::var("PLATFORM_FEE_PERCENT")?.parse()?,
      rpc_url: std::env::var("SOLANA_RPC_URL")?,
      network: std::env::var("SOLANA_NETWORK")?,
      database_url: std::env::var("DATABASE_URL")?,
      jwt_secret: std::env::var("JWT_SECRET")?,
      bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
      price_api_url: std::env::var("PRICE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
    })
  }
}
