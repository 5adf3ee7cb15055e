use chrono::{DateTime, TimeZone, Utc};

use crate::constants::{CANDLE_INTERVAL_SECS, PRICE_SCALE};

/// Floor a timestamp to the start of its UTC minute bucket.
pub fn minute_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
  let secs = ts.timestamp();
  let aligned = secs - secs.rem_euclid(CANDLE_INTERVAL_SECS);
  Utc.timestamp_opt(aligned, 0).unwrap()
}

/// Floor a timestamp to the start of its UTC second.
pub fn second_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
  Utc.timestamp_opt(ts.timestamp(), 0).unwrap()
}

/// Normalized YES price in (0, 1).
///
/// Each reserve is divided by its seeded base liquidity so unequally seeded
/// pools still price around 0.5 at their initial state. Bases are immutable
/// and strictly positive after pool initialization.
pub fn yes_price(yes_reserve: u64, no_reserve: u64, base_yes: u64, base_no: u64) -> f64 {
  let yes_norm = yes_reserve as f64 / base_yes as f64;
  let no_norm = no_reserve as f64 / base_no as f64;
  no_norm / (yes_norm + no_norm)
}

/// Convert a 1e8 fixed-point on-chain price to a float.
pub fn fixed_to_f64(price: u64) -> f64 {
  price as f64 / PRICE_SCALE as f64
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minute_bucket_aligns_down() {
    let ts = Utc.timestamp_opt(119, 500_000_000).unwrap();
    assert_eq!(minute_bucket(ts).timestamp(), 60);
    let exact = Utc.timestamp_opt(120, 0).unwrap();
    assert_eq!(minute_bucket(exact).timestamp(), 120);
  }

  #[test]
  fn equal_seeding_prices_at_half() {
    let p = yes_price(1_000_000_000, 1_000_000_000, 1_000_000_000, 1_000_000_000);
    assert!((p - 0.5).abs() < f64::EPSILON);
  }

  #[test]
  fn unequal_seeding_normalizes_to_half() {
    // 4:1 seeded pool still opens at 0.5 after normalization
    let p = yes_price(4_000_000_000, 1_000_000_000, 4_000_000_000, 1_000_000_000);
    assert!((p - 0.5).abs() < f64::EPSILON);
  }

  #[test]
  fn buying_yes_raises_the_price() {
    let base = 1_000_000_000u64;
    let before = yes_price(base, base, base, base);
    // YES drained, NO accrued after a BuyYes swap
    let after = yes_price(909_502_263, 1_100_000_000, base, base);
    assert!(after > before);
    assert!(after > 0.0 && after < 1.0);
  }

  #[test]
  fn fixed_point_conversion() {
    assert_eq!(fixed_to_f64(100_00000000), 100.0);
    assert!((fixed_to_f64(101_50000000) - 101.5).abs() < 1e-9);
  }
}
