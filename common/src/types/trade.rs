use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::market::ParseEnumError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
  BuyYes,
  BuyNo,
}

impl TradeType {
  /// On-chain u8 code.
  pub fn code(&self) -> u8 {
    match self {
      TradeType::BuyYes => 0,
      TradeType::BuyNo => 1,
    }
  }

  pub fn from_code(raw: u8) -> Result<Self, ParseEnumError> {
    match raw {
      0 => Ok(TradeType::BuyYes),
      1 => Ok(TradeType::BuyNo),
      other => Err(ParseEnumError {
        kind: "trade type",
        value: other.to_string(),
      }),
    }
  }
}

/// A confirmed AMM swap as reported by the client after on-chain execution.
/// Reserves are snapshots read from the swap transaction, which lets the
/// recorder price the trade without an extra RPC round-trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AmmTrade {
  pub id: Uuid,
  pub pool_id: Uuid,
  pub wallet: String,
  pub trade_type: TradeType,
  pub input_amount: u64,
  pub output_amount: u64,
  pub fee_amount: u64,
  pub tx_signature: String,
  pub pre_trade_yes_reserve: u64,
  pub pre_trade_no_reserve: u64,
  pub post_trade_yes_reserve: u64,
  pub post_trade_no_reserve: u64,
  /// Normalized YES price before the swap.
  pub price_pre: f64,
  /// Normalized YES price after the swap.
  pub price_post: f64,
  pub confirmed_at: DateTime<Utc>,
}
