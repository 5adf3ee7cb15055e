use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use common::{yes_price, AmmTrade, TradeType};
use ledger::Ledger;

use crate::error::ApiError;

/// Trade report submitted by a client after its swap confirmed on-chain.
/// The richer shape is deliberate: fee and expected output let the
/// recorder reconcile against the reserve deltas it is handed.
#[derive(Clone, Debug, Deserialize)]
pub struct TradePayload {
  pub onchain_pool_id: u64,
  pub wallet: String,
  pub trade_type: TradeType,
  pub input_amount: u64,
  pub output_amount: u64,
  pub expected_output_amount: Option<u64>,
  pub fee_amount: u64,
  pub transaction_signature: String,
  pub pre_trade_yes_reserve: u64,
  pub pre_trade_no_reserve: u64,
  pub post_trade_yes_reserve: u64,
  pub post_trade_no_reserve: u64,
  pub base_yes_liquidity: u64,
  pub base_no_liquidity: u64,
}

impl TradePayload {
  fn validate(&self) -> Result<(), ApiError> {
    if self.transaction_signature.trim().is_empty() {
      return Err(ApiError::Validation("transaction_signature required".into()));
    }
    if self.input_amount == 0 {
      return Err(ApiError::Validation("input_amount must be positive".into()));
    }
    if self.base_yes_liquidity == 0 || self.base_no_liquidity == 0 {
      return Err(ApiError::Validation("base liquidity must be positive".into()));
    }
    if self.post_trade_yes_reserve == 0 || self.post_trade_no_reserve == 0 {
      return Err(ApiError::Validation("post-trade reserves must be positive".into()));
    }
    Ok(())
  }

  fn price_pre(&self) -> f64 {
    yes_price(
      self.pre_trade_yes_reserve,
      self.pre_trade_no_reserve,
      self.base_yes_liquidity,
      self.base_no_liquidity,
    )
  }

  fn price_post(&self) -> f64 {
    yes_price(
      self.post_trade_yes_reserve,
      self.post_trade_no_reserve,
      self.base_yes_liquidity,
      self.base_no_liquidity,
    )
  }
}

/// Persist a confirmed swap: append the trade row and fold it into its
/// minute candle, idempotently on the transaction signature.
///
/// The chain already accepted the swap, so backend persistence issues are
/// not the caller's problem: if the atomic write fails it is retried in
/// the background and the derived trade is returned regardless.
pub async fn record_trade(ledger: &Ledger, payload: TradePayload) -> Result<AmmTrade, ApiError> {
  payload.validate()?;

  let pool = ledger
    .get_pool_by_onchain_id(payload.onchain_pool_id)
    .await?
    .ok_or(ApiError::NotFound("pool"))?;

  let trade = AmmTrade {
    id: Uuid::new_v4(),
    pool_id: pool.id,
    wallet: payload.wallet.clone(),
    trade_type: payload.trade_type,
    input_amount: payload.input_amount,
    output_amount: payload.output_amount,
    fee_amount: payload.fee_amount,
    tx_signature: payload.transaction_signature.clone(),
    pre_trade_yes_reserve: payload.pre_trade_yes_reserve,
    pre_trade_no_reserve: payload.pre_trade_no_reserve,
    post_trade_yes_reserve: payload.post_trade_yes_reserve,
    post_trade_no_reserve: payload.post_trade_no_reserve,
    price_pre: payload.price_pre(),
    price_post: payload.price_post(),
    confirmed_at: Utc::now(),
  };

  match ledger.record_trade(&trade).await {
    Ok((stored, inserted)) => {
      if inserted {
        if let Err(e) = ledger
          .update_pool_reserves(
            pool.id,
            trade.post_trade_yes_reserve,
            trade.post_trade_no_reserve,
            trade.confirmed_at,
          )
          .await
        {
          log::warn!("pool reserve mirror update failed for {}: {e:#}", pool.id);
        }
      }
      Ok(stored)
    }
    Err(e) => {
      log::error!(
        "trade persistence failed for {}, retrying in background: {e:#}",
        trade.tx_signature
      );
      retry_in_background(ledger.clone(), trade.clone());
      Ok(trade)
    }
  }
}

fn retry_in_background(ledger: Ledger, trade: AmmTrade) {
  tokio::spawn(async move {
    for attempt in 1..=5u32 {
      tokio::time::sleep(std::time::Duration::from_secs(1 << attempt.min(5))).await;
      match ledger.record_trade(&trade).await {
        Ok(_) => {
          log::info!("deferred trade {} persisted", trade.tx_signature);
          return;
        }
        Err(e) => log::warn!(
          "deferred trade {} attempt {attempt} failed: {e:#}",
          trade.tx_signature
        ),
      }
    }
    log::error!(
      "giving up on deferred trade {}; operator replay required",
      trade.tx_signature
    );
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload() -> TradePayload {
    TradePayload {
      onchain_pool_id: 1,
      wallet: "wallet".into(),
      trade_type: TradeType::BuyYes,
      input_amount: 100_000_000,
      output_amount: 90_497_737,
      expected_output_amount: Some(90_497_737),
      fee_amount: 500_000,
      transaction_signature: "sig".into(),
      pre_trade_yes_reserve: 1_000_000_000,
      pre_trade_no_reserve: 1_000_000_000,
      post_trade_yes_reserve: 909_502_263,
      post_trade_no_reserve: 1_100_000_000,
      base_yes_liquidity: 1_000_000_000,
      base_no_liquidity: 1_000_000_000,
    }
  }

  #[test]
  fn prices_derive_from_normalized_reserves() {
    let p = payload();
    assert!((p.price_pre() - 0.5).abs() < f64::EPSILON);
    // YES got scarcer, NO more plentiful: YES price rises
    let post = p.price_post();
    assert!(post > 0.5 && post < 1.0);
  }

  #[test]
  fn zero_input_rejected() {
    let mut p = payload();
    p.input_amount = 0;
    assert!(matches!(p.validate(), Err(ApiError::Validation(_))));
  }

  #[test]
  fn blank_signature_rejected() {
    let mut p = payload();
    p.transaction_signature = "  ".into();
    assert!(matches!(p.validate(), Err(ApiError::Validation(_))));
  }
}
