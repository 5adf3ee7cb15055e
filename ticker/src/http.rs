use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::source::{PriceSource, PriceSourceError, PriceTick, SourceCandle};
use common::RPC_TIMEOUT;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Spot prices from a Binance-compatible REST API.
pub struct HttpPriceSource {
  client: reqwest::Client,
  base_url: String,
  /// Last timestamp handed out per symbol; `current` never goes backwards.
  last_seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

#[derive(Deserialize)]
struct TickerPrice {
  price: String,
}

impl HttpPriceSource {
  pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
    Ok(Self {
      client: reqwest::Client::builder().timeout(RPC_TIMEOUT).build()?,
      base_url: base_url.into(),
      last_seen: Mutex::new(HashMap::new()),
    })
  }

  /// Successive observations of one symbol must carry non-decreasing
  /// timestamps; a wall-clock step backwards is clamped to the last value.
  fn clamp_monotonic(&self, symbol: &str, observed: DateTime<Utc>) -> DateTime<Utc> {
    let mut last_seen = self.last_seen.lock().expect("last_seen lock poisoned");
    let ts = match last_seen.get(symbol) {
      Some(prev) if *prev > observed => *prev,
      _ => observed,
    };
    last_seen.insert(symbol.to_string(), ts);
    ts
  }

  async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, PriceSourceError> {
    let url = format!("{}{}", self.base_url, path);
    let response = self
      .client
      .get(&url)
      .query(query)
      .send()
      .await
      .map_err(|e| PriceSourceError::SourceUnavailable(e.to_string()))?;

    let status = response.status();
    if status.is_client_error() {
      // Binance answers 4xx for unlisted symbols and bad intervals.
      return Err(PriceSourceError::UnknownSymbol(
        query
          .iter()
          .find(|(k, _)| *k == "symbol")
          .map(|(_, v)| v.clone())
          .unwrap_or_default(),
      ));
    }
    if !status.is_success() {
      return Err(PriceSourceError::SourceUnavailable(format!(
        "{} returned {}",
        url, status
      )));
    }
    response
      .json::<Value>()
      .await
      .map_err(|e| PriceSourceError::SourceUnavailable(e.to_string()))
  }
}

/// Parse a Binance klines payload: an array of
/// `[open_time_ms, "open", "high", "low", "close", ...]` rows.
pub fn parse_klines(value: &Value) -> Result<Vec<SourceCandle>, PriceSourceError> {
  let rows = value
    .as_array()
    .ok_or_else(|| PriceSourceError::SourceUnavailable("klines payload not an array".into()))?;

  let mut out = Vec::with_capacity(rows.len());
  for row in rows {
    let cells = row
      .as_array()
      .filter(|c| c.len() >= 5)
      .ok_or_else(|| PriceSourceError::SourceUnavailable("malformed kline row".into()))?;
    let ms = cells[0]
      .as_i64()
      .ok_or_else(|| PriceSourceError::SourceUnavailable("kline open time not an int".into()))?;
    let field = |i: usize| -> Result<f64, PriceSourceError> {
      cells[i]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| PriceSourceError::SourceUnavailable("kline price not a decimal".into()))
    };
    out.push(SourceCandle {
      timestamp: Utc
        .timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| PriceSourceError::SourceUnavailable("kline open time invalid".into()))?,
      open: field(1)?,
      high: field(2)?,
      low: field(3)?,
      close: field(4)?,
    });
  }
  Ok(out)
}

#[async_trait::async_trait]
impl PriceSource for HttpPriceSource {
  async fn current(&self, symbol: &str) -> Result<PriceTick, PriceSourceError> {
    let value = self
      .get("/api/v3/ticker/price", &[("symbol", symbol.to_string())])
      .await?;
    let ticker: TickerPrice = serde_json::from_value(value)
      .map_err(|e| PriceSourceError::SourceUnavailable(e.to_string()))?;
    let price = ticker
      .price
      .parse::<f64>()
      .map_err(|e| PriceSourceError::SourceUnavailable(e.to_string()))?;
    Ok(PriceTick {
      symbol: symbol.to_string(),
      price,
      timestamp: self.clamp_monotonic(symbol, Utc::now()),
    })
  }

  async fn at(&self, symbol: &str, ts: DateTime<Utc>) -> Result<f64, PriceSourceError> {
    let value = self
      .get(
        "/api/v3/klines",
        &[
          ("symbol", symbol.to_string()),
          ("interval", "1m".to_string()),
          ("startTime", ts.timestamp_millis().to_string()),
          ("limit", "1".to_string()),
        ],
      )
      .await?;
    let candles = parse_klines(&value)?;
    // Older than the source's kline retention: nothing comes back.
    candles
      .first()
      .map(|c| c.close)
      .ok_or(PriceSourceError::OutOfRange)
  }

  async fn candles(
    &self,
    symbol: &str,
    interval: &str,
    limit: usize,
  ) -> Result<Vec<SourceCandle>, PriceSourceError> {
    let value = self
      .get(
        "/api/v3/klines",
        &[
          ("symbol", symbol.to_string()),
          ("interval", interval.to_string()),
          ("limit", limit.to_string()),
        ],
      )
      .await?;
    parse_klines(&value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_kline_rows() {
    let payload: Value = serde_json::from_str(
      r#"[
        [60000, "0.5900", "0.6000", "0.5800", "0.5800", "7.0", 119999],
        [120000, "0.5800", "0.5950", "0.5750", "0.5900", "3.0", 179999]
      ]"#,
    )
    .unwrap();
    let candles = parse_klines(&payload).unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].timestamp.timestamp(), 60);
    assert!((candles[0].high - 0.6).abs() < f64::EPSILON);
    assert!((candles[1].close - 0.59).abs() < f64::EPSILON);
  }

  #[test]
  fn rejects_malformed_rows() {
    let payload: Value = serde_json::from_str(r#"[[60000, "0.59"]]"#).unwrap();
    assert!(parse_klines(&payload).is_err());
  }

  #[test]
  fn monotonic_clamp_never_steps_back() {
    let source = HttpPriceSource::new(DEFAULT_BASE_URL).unwrap();
    let later = Utc::now();
    let earlier = later - chrono::Duration::seconds(5);
    assert_eq!(source.clamp_monotonic("SOLUSDT", later), later);
    assert_eq!(source.clamp_monotonic("SOLUSDT", earlier), later);
    // other symbols are tracked independently
    assert_eq!(source.clamp_monotonic("PUMPUSDT", earlier), earlier);
  }
}
