use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::market::{Market, ParseEnumError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
  Active,
  Closed,
}

impl PoolStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PoolStatus::Active => "active",
      PoolStatus::Closed => "closed",
    }
  }

  pub fn from_str(s: &str) -> Result<Self, ParseEnumError> {
    match s {
      "active" => Ok(PoolStatus::Active),
      "closed" => Ok(PoolStatus::Closed),
      other => Err(ParseEnumError {
        kind: "pool status",
        value: other.to_string(),
      }),
    }
  }
}

/// Relational mirror of an on-chain AMM pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pool {
  pub id: Uuid,
  pub onchain_pool_id: u64,
  pub pool_pda_address: String,
  pub authority_pubkey: String,
  pub yes_mint: String,
  pub no_mint: String,
  pub market: Market,
  pub yes_reserve: u64,
  pub no_reserve: u64,
  pub base_yes_liquidity: u64,
  pub base_no_liquidity: u64,
  pub fee_bps: u16,
  pub total_liquidity: u64,
  pub status: PoolStatus,
  pub created_at: DateTime<Utc>,
}
