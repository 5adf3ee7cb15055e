use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use common::DuelStatistics;

use crate::store::Ledger;

impl Ledger {
  /// Credit a win. Counters are incremented in SQL, never read-modify-
  /// written in application memory; win_rate and avg_bet are recomputed
  /// from the post-increment totals in the same statement.
  pub(crate) async fn apply_win(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    bet_amount: u64,
  ) -> anyhow::Result<()> {
    sqlx::query(
      r#"
      INSERT INTO duel_statistics
        (user_id, total_duels, wins, losses, total_wagered, total_won, total_lost, win_rate, avg_bet)
      VALUES ($1, 1, 1, 0, $2, $2, 0, 100, $2)
      ON CONFLICT (user_id) DO UPDATE SET
        total_duels = duel_statistics.total_duels + 1,
        wins = duel_statistics.wins + 1,
        total_wagered = duel_statistics.total_wagered + $2,
        total_won = duel_statistics.total_won + $2,
        win_rate = (duel_statistics.wins + 1)::float8
          / (duel_statistics.total_duels + 1)::float8 * 100,
        avg_bet = (duel_statistics.total_wagered + $2)::float8
          / (duel_statistics.total_duels + 1)::float8
      "#,
    )
    .bind(user_id)
    .bind(bet_amount as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
  }

  pub(crate) async fn apply_loss(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    bet_amount: u64,
  ) -> anyhow::Result<()> {
    sqlx::query(
      r#"
      INSERT INTO duel_statistics
        (user_id, total_duels, wins, losses, total_wagered, total_won, total_lost, win_rate, avg_bet)
      VALUES ($1, 1, 0, 1, $2, 0, $2, 0, $2)
      ON CONFLICT (user_id) DO UPDATE SET
        total_duels = duel_statistics.total_duels + 1,
        losses = duel_statistics.losses + 1,
        total_wagered = duel_statistics.total_wagered + $2,
        total_lost = duel_statistics.total_lost + $2,
        win_rate = duel_statistics.wins::float8
          / (duel_statistics.total_duels + 1)::float8 * 100,
        avg_bet = (duel_statistics.total_wagered + $2)::float8
          / (duel_statistics.total_duels + 1)::float8
      "#,
    )
    .bind(user_id)
    .bind(bet_amount as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
  }

  pub async fn get_statistics(&self, user_id: Uuid) -> anyhow::Result<Option<DuelStatistics>> {
    let row = sqlx::query("SELECT * FROM duel_statistics WHERE user_id = $1")
      .bind(user_id)
      .fetch_optional(self.pool())
      .await?;
    row
      .map(|row| -> anyhow::Result<DuelStatistics> {
        Ok(DuelStatistics {
          user_id: row.try_get("user_id")?,
          total_duels: row.try_get("total_duels")?,
          wins: row.try_get("wins")?,
          losses: row.try_get("losses")?,
          total_wagered: row.try_get::<i64, _>("total_wagered")? as u64,
          total_won: row.try_get::<i64, _>("total_won")? as u64,
          total_lost: row.try_get::<i64, _>("total_lost")? as u64,
          win_rate: row.try_get("win_rate")?,
          avg_bet: row.try_get("avg_bet")?,
        })
      })
      .transpose()
  }
}
