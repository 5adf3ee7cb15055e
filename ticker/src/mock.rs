use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::source::{PriceSource, PriceSourceError, PriceTick, SourceCandle};

/// Scripted price source for tests: serves a queue of prices for one
/// symbol, repeating the final price once the script runs out.
pub struct MockPriceSource {
  symbol: String,
  script: Mutex<VecDeque<f64>>,
  last: Mutex<f64>,
}

impl MockPriceSource {
  pub fn new(symbol: impl Into<String>, prices: Vec<f64>) -> Self {
    let last = *prices.last().unwrap_or(&0.0);
    Self {
      symbol: symbol.into(),
      script: Mutex::new(prices.into()),
      last: Mutex::new(last),
    }
  }
}

#[async_trait::async_trait]
impl PriceSource for MockPriceSource {
  async fn current(&self, symbol: &str) -> Result<PriceTick, PriceSourceError> {
    if symbol != self.symbol {
      return Err(PriceSourceError::UnknownSymbol(symbol.to_string()));
    }
    let price = match self.script.lock().expect("script lock").pop_front() {
      Some(p) => {
        *self.last.lock().expect("last lock") = p;
        p
      }
      None => *self.last.lock().expect("last lock"),
    };
    Ok(PriceTick {
      symbol: symbol.to_string(),
      price,
      timestamp: Utc::now(),
    })
  }

  async fn at(&self, symbol: &str, _ts: DateTime<Utc>) -> Result<f64, PriceSourceError> {
    if symbol != self.symbol {
      return Err(PriceSourceError::UnknownSymbol(symbol.to_string()));
    }
    Ok(*self.last.lock().expect("last lock"))
  }

  async fn candles(
    &self,
    symbol: &str,
    _interval: &str,
    _limit: usize,
  ) -> Result<Vec<SourceCandle>, PriceSourceError> {
    if symbol != self.symbol {
      return Err(PriceSourceError::UnknownSymbol(symbol.to_string()));
    }
    Ok(vec![])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn serves_script_then_repeats_last() {
    let source = MockPriceSource::new("SOLUSDT", vec![100.0, 101.0]);
    assert_eq!(source.current("SOLUSDT").await.unwrap().price, 100.0);
    assert_eq!(source.current("SOLUSDT").await.unwrap().price, 101.0);
    assert_eq!(source.current("SOLUSDT").await.unwrap().price, 101.0);
  }

  #[tokio::test]
  async fn rejects_unknown_symbols() {
    let source = MockPriceSource::new("SOLUSDT", vec![1.0]);
    assert!(matches!(
      source.current("PUMPUSDT").await,
      Err(PriceSourceError::UnknownSymbol(_))
    ));
  }
}
