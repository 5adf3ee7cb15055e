use sqlx::postgres::PgRow;
use sqlx::Row;

use common::{minute_bucket, AmmTrade, TradeType};

use crate::store::Ledger;

pub(crate) fn trade_from_row(row: &PgRow) -> anyhow::Result<AmmTrade> {
  let trade_type: i16 = row.try_get("trade_type")?;
  Ok(AmmTrade {
    id: row.try_get("id")?,
    pool_id: row.try_get("pool_id")?,
    wallet: row.try_get("wallet")?,
    trade_type: TradeType::from_code(trade_type as u8)?,
    input_amount: row.try_get::<i64, _>("input_amount")? as u64,
    output_amount: row.try_get::<i64, _>("output_amount")? as u64,
    fee_amount: row.try_get::<i64, _>("fee_amount")? as u64,
    tx_signature: row.try_get("tx_signature")?,
    pre_trade_yes_reserve: row.try_get::<i64, _>("pre_trade_yes_reserve")? as u64,
    pre_trade_no_reserve: row.try_get::<i64, _>("pre_trade_no_reserve")? as u64,
    post_trade_yes_reserve: row.try_get::<i64, _>("post_trade_yes_reserve")? as u64,
    post_trade_no_reserve: row.try_get::<i64, _>("post_trade_no_reserve")? as u64,
    price_pre: row.try_get("price_pre")?,
    price_post: row.try_get("price_post")?,
    confirmed_at: row.try_get("confirmed_at")?,
  })
}

impl Ledger {
  pub async fn get_trade_by_signature(&self, signature: &str) -> anyhow::Result<Option<AmmTrade>> {
    let row = sqlx::query("SELECT * FROM amm_trades WHERE tx_signature = $1")
      .bind(signature)
      .fetch_optional(self.pool())
      .await?;
    row.as_ref().map(trade_from_row).transpose()
  }

  /// Append a confirmed trade and fold it into its minute candle in one
  /// transaction. Idempotent on the transaction signature: a duplicate
  /// submission returns the stored row untouched and writes nothing.
  pub async fn record_trade(&self, trade: &AmmTrade) -> anyhow::Result<(AmmTrade, bool)> {
    let mut tx = self.begin().await?;

    let inserted = sqlx::query(
      r#"
      INSERT INTO amm_trades (
        pool_id, wallet, trade_type, input_amount, output_amount, fee_amount,
        tx_signature, pre_trade_yes_reserve, pre_trade_no_reserve,
        post_trade_yes_reserve, post_trade_no_reserve, price_pre, price_post,
        confirmed_at
      )
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
      ON CONFLICT (tx_signature) DO NOTHING
      RETURNING *
      "#,
    )
    .bind(trade.pool_id)
    .bind(&trade.wallet)
    .bind(trade.trade_type.code() as i16)
    .bind(trade.input_amount as i64)
    .bind(trade.output_amount as i64)
    .bind(trade.fee_amount as i64)
    .bind(&trade.tx_signature)
    .bind(trade.pre_trade_yes_reserve as i64)
    .bind(trade.pre_trade_no_reserve as i64)
    .bind(trade.post_trade_yes_reserve as i64)
    .bind(trade.post_trade_no_reserve as i64)
    .bind(trade.price_pre)
    .bind(trade.price_post)
    .bind(trade.confirmed_at)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = inserted else {
      // Duplicate: hand back the prior result with no side effects.
      tx.rollback().await?;
      let existing = self
        .get_trade_by_signature(&trade.tx_signature)
        .await?
        .ok_or_else(|| anyhow::anyhow!("conflicting trade row vanished: {}", trade.tx_signature))?;
      return Ok((existing, false));
    };
    let stored = trade_from_row(&row)?;

    Self::upsert_minute_candle(
      &mut tx,
      trade.pool_id,
      minute_bucket(trade.confirmed_at),
      trade.price_pre,
      trade.price_post,
      trade.input_amount,
    )
    .await?;

    tx.commit().await?;
    Ok((stored, true))
  }
}
