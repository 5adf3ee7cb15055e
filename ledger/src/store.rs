use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

/// A ledger transaction; holds any row and advisory locks taken through it
/// until commit or drop (rollback).
pub type LedgerTx = Transaction<'static, Postgres>;

/// Handle to the relational mirror. Cheap to clone; all repositories hang
/// off this type as `impl` blocks in sibling modules.
#[derive(Clone)]
pub struct Ledger {
  pool: PgPool,
}

impl Ledger {
  pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(16)
      .connect(database_url)
      .await?;
    Ok(Self { pool })
  }

  /// Apply pending migrations from `ledger/migrations`.
  pub async fn migrate(&self) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  pub async fn begin(&self) -> anyhow::Result<LedgerTx> {
    Ok(self.pool.begin().await?)
  }

  /// Take a transaction-scoped advisory lock on a duel. Returns false when
  /// another coordinator instance already holds it; the caller skips the
  /// row and retries on its next sweep.
  pub async fn try_advisory_lock(
    tx: &mut Transaction<'_, Postgres>,
    onchain_duel_id: u64,
  ) -> anyhow::Result<bool> {
    let row: (bool,) = sqlx::query_as("SELECT pg_try_advisory_xact_lock($1)")
      .bind(onchain_duel_id as i64)
      .fetch_one(&mut **tx)
      .await?;
    Ok(row.0)
  }
}
