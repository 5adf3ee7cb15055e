use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use common::{Market, Pool, PoolStatus};

use crate::store::Ledger;

pub(crate) fn pool_from_row(row: &PgRow) -> anyhow::Result<Pool> {
  let status: String = row.try_get("status")?;
  let market_id: i16 = row.try_get("market_id")?;
  Ok(Pool {
    id: row.try_get("id")?,
    onchain_pool_id: row.try_get::<i64, _>("onchain_pool_id")? as u64,
    pool_pda_address: row.try_get("pool_pda_address")?,
    authority_pubkey: row.try_get("authority_pubkey")?,
    yes_mint: row.try_get("yes_mint")?,
    no_mint: row.try_get("no_mint")?,
    market: Market::from_id(market_id as u16)
      .ok_or_else(|| anyhow::anyhow!("unknown market id {market_id}"))?,
    yes_reserve: row.try_get::<i64, _>("yes_reserve")? as u64,
    no_reserve: row.try_get::<i64, _>("no_reserve")? as u64,
    base_yes_liquidity: row.try_get::<i64, _>("base_yes_liquidity")? as u64,
    base_no_liquidity: row.try_get::<i64, _>("base_no_liquidity")? as u64,
    fee_bps: row.try_get::<i16, _>("fee_bps")? as u16,
    total_liquidity: row.try_get::<i64, _>("total_liquidity")? as u64,
    status: PoolStatus::from_str(&status)?,
    created_at: row.try_get("created_at")?,
  })
}

impl Ledger {
  pub async fn get_pool(&self, id: Uuid) -> anyhow::Result<Option<Pool>> {
    let row = sqlx::query("SELECT * FROM pools WHERE id = $1")
      .bind(id)
      .fetch_optional(self.pool())
      .await?;
    row.as_ref().map(pool_from_row).transpose()
  }

  pub async fn get_pool_by_onchain_id(&self, onchain_id: u64) -> anyhow::Result<Option<Pool>> {
    let row = sqlx::query("SELECT * FROM pools WHERE onchain_pool_id = $1")
      .bind(onchain_id as i64)
      .fetch_optional(self.pool())
      .await?;
    row.as_ref().map(pool_from_row).transpose()
  }

  pub async fn get_pool_by_market(&self, market: Market) -> anyhow::Result<Option<Pool>> {
    let row = sqlx::query(
      "SELECT * FROM pools WHERE market_id = $1 AND status = 'active' ORDER BY created_at DESC LIMIT 1",
    )
    .bind(market.id() as i16)
    .fetch_optional(self.pool())
    .await?;
    row.as_ref().map(pool_from_row).transpose()
  }

  /// Mirror an initialized on-chain pool.
  pub async fn insert_pool(&self, pool: &Pool) -> anyhow::Result<Pool> {
    let row = sqlx::query(
      r#"
      INSERT INTO pools (
        onchain_pool_id, pool_pda_address, authority_pubkey, yes_mint, no_mint,
        market_id, yes_reserve, no_reserve, base_yes_liquidity, base_no_liquidity,
        fee_bps, total_liquidity, status
      )
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
      RETURNING *
      "#,
    )
    .bind(pool.onchain_pool_id as i64)
    .bind(&pool.pool_pda_address)
    .bind(&pool.authority_pubkey)
    .bind(&pool.yes_mint)
    .bind(&pool.no_mint)
    .bind(pool.market.id() as i16)
    .bind(pool.yes_reserve as i64)
    .bind(pool.no_reserve as i64)
    .bind(pool.base_yes_liquidity as i64)
    .bind(pool.base_no_liquidity as i64)
    .bind(pool.fee_bps as i16)
    .bind(pool.total_liquidity as i64)
    .bind(pool.status.as_str())
    .fetch_one(self.pool())
    .await?;
    pool_from_row(&row)
  }

  /// Advance mirrored reserves to a later on-chain snapshot. Trades can
  /// confirm out of order; older snapshots must not clobber newer ones.
  pub async fn update_pool_reserves(
    &self,
    id: Uuid,
    yes_reserve: u64,
    no_reserve: u64,
    confirmed_at: chrono::DateTime<chrono::Utc>,
  ) -> anyhow::Result<()> {
    sqlx::query(
      r#"
      UPDATE pools SET yes_reserve = $2, no_reserve = $3
      WHERE id = $1 AND NOT EXISTS (
        SELECT 1 FROM amm_trades
        WHERE amm_trades.pool_id = $1 AND amm_trades.confirmed_at > $4
      )
      "#,
    )
    .bind(id)
    .bind(yes_reserve as i64)
    .bind(no_reserve as i64)
    .bind(confirmed_at)
    .execute(self.pool())
    .await?;
    Ok(())
  }
}
