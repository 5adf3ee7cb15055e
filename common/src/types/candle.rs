use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minute-bucketed OHLC candle of a pool's normalized YES price.
///
/// Unique on (pool_id, bucket_start). `open` is seeded from the pre-trade
/// price of the bucket's first swap so candles chain continuously with the
/// previous bucket's close.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PriceCandle {
  pub pool_id: Uuid,
  pub bucket_start: DateTime<Utc>,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
  /// Sum of input amounts across the bucket's swaps.
  pub volume: u64,
}

/// Second-grained spot-price tick streamed while a duel is Active,
/// persisted for client chart replay. Never used for resolution.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DuelPriceCandle {
  pub duel_id: Uuid,
  pub bucket_start: DateTime<Utc>,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
}

impl PriceCandle {
  /// Fold one trade into the candle, preserving `open`.
  pub fn apply(&mut self, price_post: f64, volume: u64) {
    self.close = price_post;
    self.high = self.high.max(price_post);
    self.low = self.low.min(price_post);
    self.volume += volume;
  }

  /// Candle for a bucket's first trade. `price_pre` seeds the open.
  pub fn seed(
    pool_id: Uuid,
    bucket_start: DateTime<Utc>,
    price_pre: f64,
    price_post: f64,
    volume: u64,
  ) -> Self {
    Self {
      pool_id,
      bucket_start,
      open: price_pre,
      high: price_pre.max(price_post),
      low: price_pre.min(price_post),
      close: price_post,
      volume,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn two_swaps_in_one_bucket() {
    // First swap moves the price from 0.5 to 0.6, second down to 0.58.
    let bucket = Utc.timestamp_opt(60, 0).unwrap();
    let mut candle = PriceCandle::seed(Uuid::nil(), bucket, 0.5, 0.6, 5_000_000);
    candle.apply(0.58, 2_000_000);

    assert!((candle.open - 0.5).abs() < f64::EPSILON);
    assert!((candle.high - 0.6).abs() < f64::EPSILON);
    assert!((candle.low - 0.5).abs() < f64::EPSILON);
    assert!((candle.close - 0.58).abs() < f64::EPSILON);
    assert_eq!(candle.volume, 7_000_000);
  }

  #[test]
  fn open_never_moves() {
    let bucket = Utc.timestamp_opt(0, 0).unwrap();
    let mut candle = PriceCandle::seed(Uuid::nil(), bucket, 0.42, 0.45, 1);
    for price in [0.5, 0.3, 0.7] {
      candle.apply(price, 1);
    }
    assert!((candle.open - 0.42).abs() < f64::EPSILON);
    assert!((candle.high - 0.7).abs() < f64::EPSILON);
    assert!((candle.low - 0.3).abs() < f64::EPSILON);
  }
}
