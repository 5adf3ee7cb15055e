use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use common::{second_bucket, DuelPriceCandle, PriceCandle};

use crate::store::Ledger;

fn candle_from_row(row: &PgRow) -> anyhow::Result<PriceCandle> {
  Ok(PriceCandle {
    pool_id: row.try_get("pool_id")?,
    bucket_start: row.try_get("bucket_start")?,
    open: row.try_get("open")?,
    high: row.try_get("high")?,
    low: row.try_get("low")?,
    close: row.try_get("close")?,
    volume: row.try_get::<i64, _>("volume")? as u64,
  })
}

impl Ledger {
  /// Fold one trade into its minute candle in a single statement, so
  /// concurrent recorders serialize on the (pool_id, bucket_start) row.
  ///
  /// A fresh bucket opens at the trade's pre-trade price, which keeps the
  /// candle series continuous with the previous bucket's close. `open`
  /// never changes after that.
  pub(crate) async fn upsert_minute_candle(
    tx: &mut Transaction<'_, Postgres>,
    pool_id: Uuid,
    bucket_start: DateTime<Utc>,
    price_pre: f64,
    price_post: f64,
    volume: u64,
  ) -> anyhow::Result<()> {
    sqlx::query(
      r#"
      INSERT INTO price_candles (pool_id, bucket_start, open, high, low, close, volume)
      VALUES ($1, $2, $3, GREATEST($3, $4), LEAST($3, $4), $4, $5)
      ON CONFLICT (pool_id, bucket_start) DO UPDATE SET
        close = $4,
        high = GREATEST(price_candles.high, $4),
        low = LEAST(price_candles.low, $4),
        volume = price_candles.volume + $5
      "#,
    )
    .bind(pool_id)
    .bind(bucket_start)
    .bind(price_pre)
    .bind(price_post)
    .bind(volume as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
  }

  pub async fn candles_for_pool(
    &self,
    pool_id: Uuid,
    limit: i64,
  ) -> anyhow::Result<Vec<PriceCandle>> {
    let rows = sqlx::query(
      r#"
      SELECT * FROM (
        SELECT * FROM price_candles
        WHERE pool_id = $1
        ORDER BY bucket_start DESC
        LIMIT $2
      ) recent ORDER BY bucket_start
      "#,
    )
    .bind(pool_id)
    .bind(limit)
    .fetch_all(self.pool())
    .await?;
    rows.iter().map(candle_from_row).collect()
  }

  /// Persist one streamed spot sample for a live duel at second grain.
  /// These ticks back client chart replay only; resolution re-queries the
  /// price source directly.
  pub async fn record_duel_tick(
    &self,
    duel_id: Uuid,
    ts: DateTime<Utc>,
    price: f64,
  ) -> anyhow::Result<()> {
    sqlx::query(
      r#"
      INSERT INTO duel_price_candles (duel_id, bucket_start, open, high, low, close)
      VALUES ($1, $2, $3, $3, $3, $3)
      ON CONFLICT (duel_id, bucket_start) DO UPDATE SET
        close = $3,
        high = GREATEST(duel_price_candles.high, $3),
        low = LEAST(duel_price_candles.low, $3)
      "#,
    )
    .bind(duel_id)
    .bind(second_bucket(ts))
    .bind(price)
    .execute(self.pool())
    .await?;
    Ok(())
  }

  pub async fn duel_ticks(&self, duel_id: Uuid) -> anyhow::Result<Vec<DuelPriceCandle>> {
    let rows = sqlx::query(
      "SELECT * FROM duel_price_candles WHERE duel_id = $1 ORDER BY bucket_start",
    )
    .bind(duel_id)
    .fetch_all(self.pool())
    .await?;
    rows
      .iter()
      .map(|row| -> anyhow::Result<DuelPriceCandle> {
        Ok(DuelPriceCandle {
          duel_id: row.try_get("duel_id")?,
          bucket_start: row.try_get("bucket_start")?,
          open: row.try_get("open")?,
          high: row.try_get("high")?,
          low: row.try_get("low")?,
          close: row.try_get("close")?,
        })
      })
      .collect()
  }
}
