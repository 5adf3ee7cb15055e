use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use common::PRICE_SCALE;

#[derive(Debug, thiserror::Error)]
pub enum PriceSourceError {
  #[error("unknown symbol: {0}")]
  UnknownSymbol(String),
  #[error("price source unavailable: {0}")]
  SourceUnavailable(String),
  #[error("timestamp outside the source's retention window")]
  OutOfRange,
}

/// A spot price observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceTick {
  pub symbol: String,
  pub price: f64,
  pub timestamp: DateTime<Utc>,
}

impl PriceTick {
  /// On-chain representation: 1e8 fixed-point.
  pub fn to_fixed(&self) -> u64 {
    (self.price * PRICE_SCALE as f64).round() as u64
  }
}

/// An OHLC candle as served by the upstream source.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SourceCandle {
  pub timestamp: DateTime<Utc>,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
}

/// Read-only spot price provider.
///
/// Successive `current` calls for one symbol return non-decreasing
/// timestamps; ties break in request order. No atomic consistency is
/// promised between `current` and `at`.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
  async fn current(&self, symbol: &str) -> Result<PriceTick, PriceSourceError>;

  async fn at(&self, symbol: &str, ts: DateTime<Utc>) -> Result<f64, PriceSourceError>;

  async fn candles(
    &self,
    symbol: &str,
    interval: &str,
    limit: usize,
  ) -> Result<Vec<SourceCandle>, PriceSourceError>;
}

/// Retry `f` with doubling delays while it reports `SourceUnavailable`.
/// Other errors are returned immediately.
pub async fn with_backoff<T, F, Fut>(max_attempts: u32, mut f: F) -> Result<T, PriceSourceError>
where
  F: FnMut() -> Fut,
  Fut: std::future::Future<Output = Result<T, PriceSourceError>>,
{
  let mut delay = Duration::from_millis(250);
  let mut attempt = 0;
  loop {
    match f().await {
      Ok(v) => return Ok(v),
      Err(PriceSourceError::SourceUnavailable(msg)) => {
        attempt += 1;
        if attempt >= max_attempts {
          return Err(PriceSourceError::SourceUnavailable(msg));
        }
        log::warn!("price source unavailable (attempt {}): {}", attempt, msg);
        tokio::time::sleep(delay).await;
        delay *= 2;
      }
      Err(e) => return Err(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn fixed_point_rounds() {
    let tick = PriceTick {
      symbol: "SOLUSDT".to_string(),
      price: 101.5,
      timestamp: Utc.timestamp_opt(0, 0).unwrap(),
    };
    assert_eq!(tick.to_fixed(), 101_50000000);
  }

  #[tokio::test]
  async fn backoff_gives_up_after_max_attempts() {
    let mut calls = 0u32;
    let res: Result<(), _> = with_backoff(3, || {
      calls += 1;
      async { Err(PriceSourceError::SourceUnavailable("down".into())) }
    })
    .await;
    assert!(matches!(res, Err(PriceSourceError::SourceUnavailable(_))));
    assert_eq!(calls, 3);
  }

  #[tokio::test]
  async fn backoff_does_not_retry_unknown_symbol() {
    let mut calls = 0u32;
    let res: Result<(), _> = with_backoff(5, || {
      calls += 1;
      async { Err(PriceSourceError::UnknownSymbol("NOPE".into())) }
    })
    .await;
    assert!(matches!(res, Err(PriceSourceError::UnknownSymbol(_))));
    assert_eq!(calls, 1);
  }
}
