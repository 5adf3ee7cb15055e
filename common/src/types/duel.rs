use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::market::{Currency, Direction, Market, ParseEnumError};

/// Off-chain duel lifecycle. Starting and Expired exist only in the mirror:
/// on-chain a started duel is Active immediately (with a future started_at)
/// and an expired duel is Cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelStatus {
  Pending,
  Matched,
  Starting,
  Active,
  Resolved,
  Cancelled,
  Expired,
}

impl DuelStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      DuelStatus::Pending => "pending",
      DuelStatus::Matched => "matched",
      DuelStatus::Starting => "starting",
      DuelStatus::Active => "active",
      DuelStatus::Resolved => "resolved",
      DuelStatus::Cancelled => "cancelled",
      DuelStatus::Expired => "expired",
    }
  }

  pub fn from_str(s: &str) -> Result<Self, ParseEnumError> {
    match s {
      "pending" => Ok(DuelStatus::Pending),
      "matched" => Ok(DuelStatus::Matched),
      "starting" => Ok(DuelStatus::Starting),
      "active" => Ok(DuelStatus::Active),
      "resolved" => Ok(DuelStatus::Resolved),
      "cancelled" => Ok(DuelStatus::Cancelled),
      "expired" => Ok(DuelStatus::Expired),
      other => Err(ParseEnumError {
        kind: "duel status",
        value: other.to_string(),
      }),
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      DuelStatus::Resolved | DuelStatus::Cancelled | DuelStatus::Expired
    )
  }
}

/// Relational mirror of an on-chain duel. The chain is authoritative; on
/// reconciliation conflict the mirror is overwritten.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Duel {
  pub id: Uuid,
  pub onchain_duel_id: u64,
  pub player1_id: Uuid,
  pub player2_id: Option<Uuid>,
  pub player1_wallet: String,
  pub player2_wallet: Option<String>,
  pub stake_mint: String,
  pub bet_amount: u64,
  pub currency: Currency,
  pub market: Market,
  pub direction_p1: Direction,
  pub direction_p2: Option<Direction>,
  pub status: DuelStatus,
  /// 1e8 fixed-point. Set exactly once at the Starting boundary.
  pub entry_price: Option<u64>,
  /// 1e8 fixed-point. Set exactly once on Resolved.
  pub exit_price: Option<u64>,
  pub winner_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub starting_at: Option<DateTime<Utc>>,
  pub started_at: Option<DateTime<Utc>>,
  pub resolved_at: Option<DateTime<Utc>>,
  pub expires_at: DateTime<Utc>,
  pub escrow_tx_hash: Option<String>,
  pub resolution_tx_hash: Option<String>,
  pub resolve_attempts: i32,
  pub needs_intervention: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuelResult {
  pub id: Uuid,
  pub duel_id: Uuid,
  pub winner_id: Uuid,
  pub payout: u64,
  pub fee: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelTxKind {
  Deposit,
  Payout,
  Refund,
}

impl DuelTxKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      DuelTxKind::Deposit => "deposit",
      DuelTxKind::Payout => "payout",
      DuelTxKind::Refund => "refund",
    }
  }

  pub fn from_str(s: &str) -> Result<Self, ParseEnumError> {
    match s {
      "deposit" => Ok(DuelTxKind::Deposit),
      "payout" => Ok(DuelTxKind::Payout),
      "refund" => Ok(DuelTxKind::Refund),
      other => Err(ParseEnumError {
        kind: "duel tx kind",
        value: other.to_string(),
      }),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelTxStatus {
  Pending,
  Confirmed,
  Failed,
}

impl DuelTxStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      DuelTxStatus::Pending => "pending",
      DuelTxStatus::Confirmed => "confirmed",
      DuelTxStatus::Failed => "failed",
    }
  }

  pub fn from_str(s: &str) -> Result<Self, ParseEnumError> {
    match s {
      "pending" => Ok(DuelTxStatus::Pending),
      "confirmed" => Ok(DuelTxStatus::Confirmed),
      "failed" => Ok(DuelTxStatus::Failed),
      other => Err(ParseEnumError {
        kind: "duel tx status",
        value: other.to_string(),
      }),
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuelTransaction {
  pub id: Uuid,
  pub duel_id: Uuid,
  pub user_id: Uuid,
  pub kind: DuelTxKind,
  pub tx_hash: String,
  pub status: DuelTxStatus,
  pub confirmations: i32,
  pub amount: u64,
}

/// Split a duel's gross pot into (winner_payout, platform_fee).
///
/// gross = 2 * bet; the fee floors; payout + fee = gross always. None on
/// overflow, which the on-chain bet bounds already exclude.
pub fn payout_split(bet_amount: u64, fee_bps: u16) -> Option<(u64, u64)> {
  let gross = bet_amount.checked_mul(2)?;
  let fee = ((gross as u128).checked_mul(fee_bps as u128)? / 10_000) as u64;
  Some((gross.checked_sub(fee)?, fee))
}

/// Per-user duel counters, upserted atomically with each resolution.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DuelStatistics {
  pub user_id: Uuid,
  pub total_duels: i64,
  pub wins: i64,
  pub losses: i64,
  pub total_wagered: u64,
  pub total_won: u64,
  pub total_lost: u64,
  /// Percentage in [0, 100], recomputed from the counters on every upsert.
  pub win_rate: f64,
  pub avg_bet: f64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn five_percent_fee_split() {
    let (payout, fee) = payout_split(10_000_000, 500).unwrap();
    assert_eq!(payout, 19_000_000);
    assert_eq!(fee, 1_000_000);
    assert_eq!(payout + fee, 20_000_000);
  }

  #[test]
  fn terminal_states() {
    assert!(DuelStatus::Resolved.is_terminal());
    assert!(DuelStatus::Expired.is_terminal());
    assert!(!DuelStatus::Starting.is_terminal());
  }

  #[test]
  fn status_round_trips_through_text() {
    for status in [
      DuelStatus::Pending,
      DuelStatus::Matched,
      DuelStatus::Starting,
      DuelStatus::Active,
      DuelStatus::Resolved,
      DuelStatus::Cancelled,
      DuelStatus::Expired,
    ] {
      assert_eq!(DuelStatus::from_str(status.as_str()).unwrap(), status);
    }
    assert!(DuelStatus::from_str("limbo").is_err());
  }
}
