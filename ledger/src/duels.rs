use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use common::{
  Currency, Direction, Duel, DuelStatus, DuelTxKind, DuelTxStatus, Market, DUEL_DURATION,
};

use crate::store::Ledger;

/// Fields supplied when mirroring a confirmed on-chain CreateDuel.
#[derive(Clone, Debug)]
pub struct NewDuel {
  pub onchain_duel_id: u64,
  pub player1_id: Uuid,
  pub player1_wallet: String,
  pub stake_mint: String,
  pub bet_amount: u64,
  pub currency: Currency,
  pub market: Market,
  pub direction_p1: Direction,
  pub expires_at: DateTime<Utc>,
  pub escrow_tx_hash: String,
}

/// How a locked resolution attempt ended; written atomically with the
/// duel's terminal state.
#[derive(Clone, Debug)]
pub struct ResolutionOutcome {
  pub exit_price: u64,
  /// None on an exact tie: the duel is cancelled with both refunded.
  pub winner_id: Option<Uuid>,
  pub payout: u64,
  pub fee: u64,
  /// None when the terminal state was reconciled from the chain rather
  /// than observed through our own dispatch.
  pub resolution_tx_hash: Option<String>,
}

pub(crate) fn duel_from_row(row: &PgRow) -> anyhow::Result<Duel> {
  let currency: String = row.try_get("currency")?;
  let status: String = row.try_get("status")?;
  let market_id: i16 = row.try_get("market_id")?;
  let direction_p1: String = row.try_get("direction_p1")?;
  let direction_p2: Option<String> = row.try_get("direction_p2")?;
  Ok(Duel {
    id: row.try_get("id")?,
    onchain_duel_id: row.try_get::<i64, _>("onchain_duel_id")? as u64,
    player1_id: row.try_get("player1_id")?,
    player2_id: row.try_get("player2_id")?,
    player1_wallet: row.try_get("player1_wallet")?,
    player2_wallet: row.try_get("player2_wallet")?,
    stake_mint: row.try_get("stake_mint")?,
    bet_amount: row.try_get::<i64, _>("bet_amount")? as u64,
    currency: Currency::from_str(&currency)?,
    market: Market::from_id(market_id as u16)
      .ok_or_else(|| anyhow::anyhow!("unknown market id {market_id}"))?,
    direction_p1: Direction::from_str(&direction_p1)?,
    direction_p2: direction_p2.as_deref().map(Direction::from_str).transpose()?,
    status: DuelStatus::from_str(&status)?,
    entry_price: row
      .try_get::<Option<i64>, _>("entry_price")?
      .map(|p| p as u64),
    exit_price: row
      .try_get::<Option<i64>, _>("exit_price")?
      .map(|p| p as u64),
    winner_id: row.try_get("winner_id")?,
    created_at: row.try_get("created_at")?,
    starting_at: row.try_get("starting_at")?,
    started_at: row.try_get("started_at")?,
    resolved_at: row.try_get("resolved_at")?,
    expires_at: row.try_get("expires_at")?,
    escrow_tx_hash: row.try_get("escrow_tx_hash")?,
    resolution_tx_hash: row.try_get("resolution_tx_hash")?,
    resolve_attempts: row.try_get("resolve_attempts")?,
    needs_intervention: row.try_get("needs_intervention")?,
  })
}

impl Ledger {
  pub async fn insert_duel(&self, new: NewDuel) -> anyhow::Result<Duel> {
    let row = sqlx::query(
      r#"
      INSERT INTO duels (
        onchain_duel_id, player1_id, player1_wallet, stake_mint, bet_amount,
        currency, market_id, direction_p1, status, expires_at, escrow_tx_hash
      )
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9, $10)
      RETURNING *
      "#,
    )
    .bind(new.onchain_duel_id as i64)
    .bind(new.player1_id)
    .bind(&new.player1_wallet)
    .bind(&new.stake_mint)
    .bind(new.bet_amount as i64)
    .bind(new.currency.as_str())
    .bind(new.market.id() as i16)
    .bind(new.direction_p1.as_str())
    .bind(new.expires_at)
    .bind(&new.escrow_tx_hash)
    .fetch_one(self.pool())
    .await?;
    duel_from_row(&row)
  }

  pub async fn get_duel(&self, id: Uuid) -> anyhow::Result<Option<Duel>> {
    let row = sqlx::query("SELECT * FROM duels WHERE id = $1")
      .bind(id)
      .fetch_optional(self.pool())
      .await?;
    row.as_ref().map(duel_from_row).transpose()
  }

  pub async fn get_duel_by_onchain_id(&self, onchain_id: u64) -> anyhow::Result<Option<Duel>> {
    let row = sqlx::query("SELECT * FROM duels WHERE onchain_duel_id = $1")
      .bind(onchain_id as i64)
      .fetch_optional(self.pool())
      .await?;
    row.as_ref().map(duel_from_row).transpose()
  }

  /// Mirror a confirmed JoinDuel: records player 2 on the complementary
  /// direction and moves the row to Matched.
  pub async fn join_duel(
    &self,
    id: Uuid,
    player2_id: Uuid,
    player2_wallet: &str,
  ) -> anyhow::Result<Option<Duel>> {
    let row = sqlx::query(
      r#"
      UPDATE duels SET
        player2_id = $2,
        player2_wallet = $3,
        direction_p2 = CASE direction_p1 WHEN 'up' THEN 'down' ELSE 'up' END,
        status = 'matched'
      WHERE id = $1 AND status = 'pending' AND expires_at > now()
      RETURNING *
      "#,
    )
    .bind(id)
    .bind(player2_id)
    .bind(player2_wallet)
    .fetch_optional(self.pool())
    .await?;
    row.as_ref().map(duel_from_row).transpose()
  }

  /// Off-chain guard only: the program does not stop a player from
  /// opening two Pending duels at the same stake, the API does.
  pub async fn has_open_pending_duel(
    &self,
    player1_id: Uuid,
    bet_amount: u64,
  ) -> anyhow::Result<bool> {
    let row = sqlx::query(
      r#"
      SELECT 1 FROM duels
      WHERE player1_id = $1 AND bet_amount = $2
        AND status = 'pending' AND expires_at > now()
      LIMIT 1
      "#,
    )
    .bind(player1_id)
    .bind(bet_amount as i64)
    .fetch_optional(self.pool())
    .await?;
    Ok(row.is_some())
  }

  /// Pending, unexpired duels open for an opponent.
  pub async fn available_duels(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Duel>> {
    let rows = sqlx::query(
      r#"
      SELECT * FROM duels
      WHERE status = 'pending' AND expires_at > now()
      ORDER BY created_at DESC
      LIMIT $1 OFFSET $2
      "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(self.pool())
    .await?;
    rows.iter().map(duel_from_row).collect()
  }

  pub async fn duels_for_user(
    &self,
    user_id: Uuid,
    limit: i64,
    offset: i64,
  ) -> anyhow::Result<Vec<Duel>> {
    let rows = sqlx::query(
      r#"
      SELECT * FROM duels
      WHERE player1_id = $1 OR player2_id = $1
      ORDER BY created_at DESC
      LIMIT $2 OFFSET $3
      "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(self.pool())
    .await?;
    rows.iter().map(duel_from_row).collect()
  }

  /// Pending duels past their TTL, ready for the expiry sweep.
  pub async fn duels_due_for_expiry(&self) -> anyhow::Result<Vec<Duel>> {
    let rows = sqlx::query(
      r#"
      SELECT * FROM duels
      WHERE status = 'pending' AND expires_at <= now() AND NOT needs_intervention
      ORDER BY expires_at
      "#,
    )
    .fetch_all(self.pool())
    .await?;
    rows.iter().map(duel_from_row).collect()
  }

  /// Matched duels awaiting a start dispatch.
  pub async fn duels_awaiting_start(&self) -> anyhow::Result<Vec<Duel>> {
    let rows = sqlx::query(
      "SELECT * FROM duels WHERE status = 'matched' AND NOT needs_intervention ORDER BY created_at",
    )
    .fetch_all(self.pool())
    .await?;
    rows.iter().map(duel_from_row).collect()
  }

  /// Starting and Active duels, regardless of elapsed time. Used to
  /// re-establish price streaming after a coordinator restart.
  pub async fn live_duels(&self) -> anyhow::Result<Vec<Duel>> {
    let rows = sqlx::query(
      "SELECT * FROM duels WHERE status IN ('starting', 'active') AND NOT needs_intervention",
    )
    .fetch_all(self.pool())
    .await?;
    rows.iter().map(duel_from_row).collect()
  }

  /// Flip Starting rows to Active once their countdown has elapsed.
  pub async fn promote_started_duels(&self) -> anyhow::Result<u64> {
    let result =
      sqlx::query("UPDATE duels SET status = 'active' WHERE status = 'starting' AND started_at <= now()")
        .execute(self.pool())
        .await?;
    Ok(result.rows_affected())
  }

  /// Live duels whose duration has fully elapsed.
  pub async fn duels_due_for_resolution(&self) -> anyhow::Result<Vec<Duel>> {
    let cutoff = Utc::now() - chrono::Duration::from_std(DUEL_DURATION)?;
    let rows = sqlx::query(
      r#"
      SELECT * FROM duels
      WHERE status IN ('starting', 'active')
        AND started_at IS NOT NULL AND started_at <= $1
        AND NOT needs_intervention
      ORDER BY started_at
      "#,
    )
    .bind(cutoff)
    .fetch_all(self.pool())
    .await?;
    rows.iter().map(duel_from_row).collect()
  }

  /// Row lock for the span of a state-changing dispatch.
  pub async fn lock_duel(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
  ) -> anyhow::Result<Option<Duel>> {
    let row = sqlx::query("SELECT * FROM duels WHERE id = $1 FOR UPDATE")
      .bind(id)
      .fetch_optional(&mut **tx)
      .await?;
    row.as_ref().map(duel_from_row).transpose()
  }

  /// Record a confirmed StartDuel: entry price is set exactly once here.
  pub async fn mark_duel_starting(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    entry_price: u64,
    starting_at: DateTime<Utc>,
    started_at: DateTime<Utc>,
  ) -> anyhow::Result<()> {
    sqlx::query(
      r#"
      UPDATE duels SET
        status = 'starting',
        entry_price = $2,
        starting_at = $3,
        started_at = $4
      WHERE id = $1 AND status = 'matched'
      "#,
    )
    .bind(id)
    .bind(entry_price as i64)
    .bind(starting_at)
    .bind(started_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
  }

  /// Persist a terminal resolution (or tie-cancellation) together with the
  /// result row, payout/refund transactions and both players' statistics.
  /// Must run inside the transaction that holds the duel's locks.
  pub async fn apply_resolution(
    tx: &mut Transaction<'_, Postgres>,
    duel: &Duel,
    outcome: &ResolutionOutcome,
  ) -> anyhow::Result<()> {
    let player2_id = duel
      .player2_id
      .ok_or_else(|| anyhow::anyhow!("resolving duel {} without player 2", duel.id))?;

    match outcome.winner_id {
      Some(winner_id) => {
        sqlx::query(
          r#"
          UPDATE duels SET
            status = 'resolved',
            exit_price = $2,
            winner_id = $3,
            resolved_at = now(),
            resolution_tx_hash = $4
          WHERE id = $1
          "#,
        )
        .bind(duel.id)
        .bind(outcome.exit_price as i64)
        .bind(winner_id)
        .bind(outcome.resolution_tx_hash.as_deref())
        .execute(&mut **tx)
        .await?;

        sqlx::query(
          "INSERT INTO duel_results (duel_id, winner_id, payout, fee) VALUES ($1, $2, $3, $4)",
        )
        .bind(duel.id)
        .bind(winner_id)
        .bind(outcome.payout as i64)
        .bind(outcome.fee as i64)
        .execute(&mut **tx)
        .await?;

        Self::insert_duel_transaction(
          tx,
          duel.id,
          winner_id,
          DuelTxKind::Payout,
          outcome.resolution_tx_hash.as_deref().unwrap_or_default(),
          DuelTxStatus::Confirmed,
          outcome.payout,
        )
        .await?;

        let loser_id = if winner_id == duel.player1_id {
          player2_id
        } else {
          duel.player1_id
        };
        Self::apply_win(tx, winner_id, duel.bet_amount).await?;
        Self::apply_loss(tx, loser_id, duel.bet_amount).await?;
      }
      None => {
        // Tie: cancelled with both stakes refunded, statistics untouched.
        sqlx::query(
          r#"
          UPDATE duels SET
            status = 'cancelled',
            exit_price = $2,
            resolved_at = now(),
            resolution_tx_hash = $3
          WHERE id = $1
          "#,
        )
        .bind(duel.id)
        .bind(outcome.exit_price as i64)
        .bind(outcome.resolution_tx_hash.as_deref())
        .execute(&mut **tx)
        .await?;

        for user_id in [duel.player1_id, player2_id] {
          Self::insert_duel_transaction(
            tx,
            duel.id,
            user_id,
            DuelTxKind::Refund,
            outcome.resolution_tx_hash.as_deref().unwrap_or_default(),
            DuelTxStatus::Confirmed,
            duel.bet_amount,
          )
          .await?;
        }
      }
    }
    Ok(())
  }

  /// Persist a swept expiry: the on-chain cancel refunded player 1. The
  /// hash is absent when the cancel was reconciled rather than dispatched.
  pub async fn apply_expiry(
    tx: &mut Transaction<'_, Postgres>,
    duel: &Duel,
    cancel_tx_hash: Option<&str>,
  ) -> anyhow::Result<()> {
    sqlx::query(
      "UPDATE duels SET status = 'expired', resolution_tx_hash = $2 WHERE id = $1",
    )
    .bind(duel.id)
    .bind(cancel_tx_hash)
    .execute(&mut **tx)
    .await?;

    Self::insert_duel_transaction(
      tx,
      duel.id,
      duel.player1_id,
      DuelTxKind::Refund,
      cancel_tx_hash.unwrap_or_default(),
      DuelTxStatus::Confirmed,
      duel.bet_amount,
    )
    .await?;
    Ok(())
  }

  pub async fn insert_duel_transaction(
    tx: &mut Transaction<'_, Postgres>,
    duel_id: Uuid,
    user_id: Uuid,
    kind: DuelTxKind,
    tx_hash: &str,
    status: DuelTxStatus,
    amount: u64,
  ) -> anyhow::Result<()> {
    sqlx::query(
      r#"
      INSERT INTO duel_transactions (duel_id, user_id, kind, tx_hash, status, amount)
      VALUES ($1, $2, $3, $4, $5, $6)
      "#,
    )
    .bind(duel_id)
    .bind(user_id)
    .bind(kind.as_str())
    .bind(tx_hash)
    .bind(status.as_str())
    .bind(amount as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
  }

  /// Record the deposit legs of create/join so the audit trail is complete.
  pub async fn record_deposit(
    &self,
    duel_id: Uuid,
    user_id: Uuid,
    tx_hash: &str,
    amount: u64,
  ) -> anyhow::Result<()> {
    let mut tx = self.begin().await?;
    Self::insert_duel_transaction(
      &mut tx,
      duel_id,
      user_id,
      DuelTxKind::Deposit,
      tx_hash,
      DuelTxStatus::Confirmed,
      amount,
    )
    .await?;
    tx.commit().await?;
    Ok(())
  }

  /// Count a failed resolve dispatch; after `max_attempts` the duel is
  /// flagged for manual intervention and excluded from sweeps until an
  /// operator resets it.
  pub async fn record_resolve_failure(
    &self,
    id: Uuid,
    max_attempts: i32,
  ) -> anyhow::Result<i32> {
    let row = sqlx::query(
      r#"
      UPDATE duels SET
        resolve_attempts = resolve_attempts + 1,
        needs_intervention = (resolve_attempts + 1 >= $2)
      WHERE id = $1
      RETURNING resolve_attempts
      "#,
    )
    .bind(id)
    .bind(max_attempts)
    .fetch_one(self.pool())
    .await?;
    Ok(row.try_get("resolve_attempts")?)
  }

  pub async fn get_duel_result(&self, duel_id: Uuid) -> anyhow::Result<Option<common::DuelResult>> {
    let row = sqlx::query("SELECT * FROM duel_results WHERE duel_id = $1")
      .bind(duel_id)
      .fetch_optional(self.pool())
      .await?;
    row
      .map(|row| -> anyhow::Result<common::DuelResult> {
        Ok(common::DuelResult {
          id: row.try_get("id")?,
          duel_id: row.try_get("duel_id")?,
          winner_id: row.try_get("winner_id")?,
          payout: row.try_get::<i64, _>("payout")? as u64,
          fee: row.try_get::<i64, _>("fee")? as u64,
        })
      })
      .transpose()
  }
}
