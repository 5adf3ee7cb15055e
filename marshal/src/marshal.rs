use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, Utc};
use log::{error, info, warn};
use solana_sdk::pubkey::Pubkey;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use common::{
  payout_split, winner_for, Duel, DuelStatus, DuelWinner, COUNTDOWN, DUEL_DURATION,
  DUEL_TICK_INTERVAL, EXPIRY_POLL, PLATFORM_FEE_BPS, RESOLVE_MAX_ATTEMPTS, RESOLVE_POLL,
};
use ledger::{Ledger, LedgerTx, ResolutionOutcome};
use relay::duel_escrow::state::DuelStatus as OnchainStatus;
use relay::RelayClient;
use ticker::{with_backoff, PriceSource};

/// Drives every duel through its lifecycle: expiry sweep for unmatched
/// duels, start dispatch for matched ones, and the resolution sweep for
/// live ones. One instance is a single cooperative loop; multiple
/// instances coordinate through per-duel advisory locks.
pub struct Marshal {
  ledger: Ledger,
  relay: Arc<RelayClient>,
  ticker: Arc<dyn PriceSource>,
  /// Exponential backoff between failed resolve dispatches, per duel.
  retry_after: HashMap<Uuid, Instant>,
  /// Duels whose 1 Hz price stream is already running.
  streaming: HashSet<Uuid>,
}

impl Marshal {
  pub fn new(ledger: Ledger, relay: Arc<RelayClient>, ticker: Arc<dyn PriceSource>) -> Self {
    Self {
      ledger,
      relay,
      ticker,
      retry_after: HashMap::new(),
      streaming: HashSet::new(),
    }
  }

  pub async fn run(&mut self) -> anyhow::Result<()> {
    info!("marshal online, authority {}", self.relay.authority());

    let mut expiry = tokio::time::interval(EXPIRY_POLL);
    expiry.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut resolve = tokio::time::interval(RESOLVE_POLL);
    resolve.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        _ = expiry.tick() => {
          if let Err(e) = self.sweep_expired().await {
            error!("expiry sweep failed: {e:#}");
          }
        }
        _ = resolve.tick() => {
          if let Err(e) = self.dispatch_starts().await {
            error!("start dispatch failed: {e:#}");
          }
          if let Err(e) = self.sweep_resolutions().await {
            error!("resolution sweep failed: {e:#}");
          }
        }
      }
    }
  }

  /// Cancel Pending duels whose TTL elapsed without an opponent.
  async fn sweep_expired(&self) -> anyhow::Result<()> {
    for duel in self.ledger.duels_due_for_expiry().await? {
      if let Err(e) = self.expire_one(&duel).await {
        warn!("failed to expire duel {}: {e:#}", duel.id);
      }
    }
    Ok(())
  }

  async fn expire_one(&self, duel: &Duel) -> anyhow::Result<()> {
    let mut tx = self.ledger.begin().await?;
    if !Ledger::try_advisory_lock(&mut tx, duel.onchain_duel_id).await? {
      return Ok(());
    }
    let Some(locked) = Ledger::lock_duel(&mut tx, duel.id).await? else {
      return Ok(());
    };
    if locked.status != DuelStatus::Pending {
      return Ok(());
    }

    let player1 = Pubkey::from_str(&locked.player1_wallet)?;
    let stake_mint = Pubkey::from_str(&locked.stake_mint)?;
    // No player 2 yet: the cancel refunds player 1 only.
    let cancel_tx_hash = match self
      .relay
      .cancel_duel(locked.onchain_duel_id, &player1, &player1, &stake_mint)
      .await
    {
      Ok(sig) => Some(sig.to_string()),
      Err(e) => {
        // The cancel may have landed during an earlier attempt whose
        // confirmation timed out; the chain decides.
        let onchain = self.relay.fetch_duel(locked.onchain_duel_id).await?;
        match onchain {
          Some(d) if d.status == OnchainStatus::Cancelled => None,
          _ => return Err(e.into()),
        }
      }
    };

    Ledger::apply_expiry(&mut tx, &locked, cancel_tx_hash.as_deref()).await?;
    tx.commit().await?;
    info!("duel {} expired unmatched, stake refunded", locked.id);
    Ok(())
  }

  /// Promote counted-down duels and dispatch StartDuel for fresh matches.
  async fn dispatch_starts(&mut self) -> anyhow::Result<()> {
    self.ledger.promote_started_duels().await?;

    for duel in self.ledger.duels_awaiting_start().await? {
      if let Err(e) = self.start_one(&duel).await {
        warn!("failed to start duel {}: {e:#}", duel.id);
      }
    }

    // Streams are in-process; after a restart live duels have none, so
    // re-attach here rather than only at start dispatch.
    for duel in self.ledger.live_duels().await? {
      self.spawn_price_stream(&duel);
    }
    Ok(())
  }

  async fn start_one(&self, duel: &Duel) -> anyhow::Result<()> {
    let mut tx = self.ledger.begin().await?;
    if !Ledger::try_advisory_lock(&mut tx, duel.onchain_duel_id).await? {
      return Ok(());
    }
    let Some(locked) = Ledger::lock_duel(&mut tx, duel.id).await? else {
      return Ok(());
    };
    if locked.status != DuelStatus::Matched {
      return Ok(());
    }

    let symbol = locked.market.symbol();
    let tick = with_backoff(3, || {
      let ticker = self.ticker.clone();
      async move { ticker.current(symbol).await }
    })
    .await?;
    let entry_price = tick.to_fixed();

    self
      .relay
      .start_duel(locked.onchain_duel_id, entry_price)
      .await?;

    let starting_at = Utc::now();
    let started_at = starting_at + ChronoDuration::from_std(COUNTDOWN)?;
    Ledger::mark_duel_starting(&mut tx, locked.id, entry_price, starting_at, started_at).await?;
    tx.commit().await?;
    info!(
      "duel {} starting at entry price {} ({})",
      locked.id, entry_price, symbol
    );

    Ok(())
  }

  /// Stream spot samples at 1 Hz into duel_price_candles while the duel is
  /// live. Replay data only: resolution never reads these ticks.
  fn spawn_price_stream(&mut self, duel: &Duel) {
    if !self.streaming.insert(duel.id) {
      return;
    }
    let ledger = self.ledger.clone();
    let ticker = self.ticker.clone();
    let duel_id = duel.id;
    let symbol = duel.market.symbol();

    tokio::spawn(async move {
      let mut tick_timer = tokio::time::interval(DUEL_TICK_INTERVAL);
      tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        tick_timer.tick().await;
        match ledger.get_duel(duel_id).await {
          Ok(Some(current)) if !current.status.is_terminal() && !current.needs_intervention => {}
          _ => break,
        }
        match ticker.current(symbol).await {
          Ok(tick) => {
            if let Err(e) = ledger.record_duel_tick(duel_id, tick.timestamp, tick.price).await {
              warn!("failed to persist tick for duel {duel_id}: {e:#}");
            }
          }
          Err(e) => warn!("price stream miss for duel {duel_id}: {e}"),
        }
      }
    });
  }

  /// Resolve every live duel whose duration has elapsed.
  async fn sweep_resolutions(&mut self) -> anyhow::Result<()> {
    for duel in self.ledger.duels_due_for_resolution().await? {
      if let Some(after) = self.retry_after.get(&duel.id) {
        if Instant::now() < *after {
          continue;
        }
      }
      match self.resolve_one(&duel).await {
        Ok(()) => {
          self.retry_after.remove(&duel.id);
          self.streaming.remove(&duel.id);
        }
        Err(e) => {
          warn!("resolve dispatch failed for duel {}: {e:#}", duel.id);
          let attempts = self
            .ledger
            .record_resolve_failure(duel.id, RESOLVE_MAX_ATTEMPTS)
            .await?;
          if attempts >= RESOLVE_MAX_ATTEMPTS {
            error!(
              "duel {} flagged for manual intervention after {attempts} attempts",
              duel.id
            );
            self.retry_after.remove(&duel.id);
          } else {
            let delay = std::time::Duration::from_secs(1 << attempts.min(6) as u32);
            self.retry_after.insert(duel.id, Instant::now() + delay);
          }
        }
      }
    }
    Ok(())
  }

  /// The advisory + row lock spans the whole fetch-price, submit, confirm,
  /// persist sequence; a failure rolls the transaction back so the next
  /// sweep retries cleanly.
  async fn resolve_one(&self, duel: &Duel) -> anyhow::Result<()> {
    let mut tx = self.ledger.begin().await?;
    if !Ledger::try_advisory_lock(&mut tx, duel.onchain_duel_id).await? {
      return Ok(());
    }
    let Some(locked) = Ledger::lock_duel(&mut tx, duel.id).await? else {
      return Ok(());
    };
    if !matches!(locked.status, DuelStatus::Starting | DuelStatus::Active) {
      return Ok(());
    }

    // A prior attempt may have landed on-chain before its confirmation
    // timed out. The chain is the source of truth: adopt its terminal
    // state instead of dispatching again.
    if locked.resolve_attempts > 0 {
      if let Some(onchain) = self.relay.fetch_duel(locked.onchain_duel_id).await? {
        if self.reconcile_terminal(&mut tx, &locked, &onchain).await? {
          tx.commit().await?;
          return Ok(());
        }
      }
    }

    let entry_price = locked
      .entry_price
      .ok_or_else(|| anyhow::anyhow!("active duel {} has no entry price", locked.id))?;
    let player2_id = locked
      .player2_id
      .ok_or_else(|| anyhow::anyhow!("active duel {} has no player 2", locked.id))?;
    let player2_wallet = locked
      .player2_wallet
      .as_deref()
      .ok_or_else(|| anyhow::anyhow!("active duel {} has no player 2 wallet", locked.id))?;

    let player1 = Pubkey::from_str(&locked.player1_wallet)?;
    let player2 = Pubkey::from_str(player2_wallet)?;
    let stake_mint = Pubkey::from_str(&locked.stake_mint)?;

    // The authoritative exit price is fetched at the dispatch moment,
    // never replayed from the streamed chart ticks.
    let symbol = locked.market.symbol();
    let tick = with_backoff(3, || {
      let ticker = self.ticker.clone();
      async move { ticker.current(symbol).await }
    })
    .await?;
    let exit_price = tick.to_fixed();

    let sig = self
      .relay
      .resolve_duel(locked.onchain_duel_id, &player1, &player2, &stake_mint, exit_price)
      .await?;

    let outcome = match winner_for(entry_price, exit_price, locked.direction_p1) {
      Some(winner) => {
        let winner_id = match winner {
          DuelWinner::Player1 => locked.player1_id,
          DuelWinner::Player2 => player2_id,
        };
        let (payout, fee) = payout_split(locked.bet_amount, PLATFORM_FEE_BPS)
          .ok_or_else(|| anyhow::anyhow!("payout overflow for duel {}", locked.id))?;
        ResolutionOutcome {
          exit_price,
          winner_id: Some(winner_id),
          payout,
          fee,
          resolution_tx_hash: Some(sig.to_string()),
        }
      }
      None => ResolutionOutcome {
        exit_price,
        winner_id: None,
        payout: 0,
        fee: 0,
        resolution_tx_hash: Some(sig.to_string()),
      },
    };

    Ledger::apply_resolution(&mut tx, &locked, &outcome).await?;
    tx.commit().await?;
    match outcome.winner_id {
      Some(winner_id) => info!(
        "duel {} resolved, winner {} takes {}",
        locked.id, winner_id, outcome.payout
      ),
      None => info!("duel {} tied at {}, stakes refunded", locked.id, exit_price),
    }
    Ok(())
  }

  /// Adopt an on-chain terminal state into the mirror. Returns true when
  /// the duel needed no further dispatch.
  async fn reconcile_terminal(
    &self,
    tx: &mut LedgerTx,
    locked: &Duel,
    onchain: &relay::duel_escrow::state::Duel,
  ) -> anyhow::Result<bool> {
    match onchain.status {
      OnchainStatus::Resolved => {
        let winner_id = if onchain.winner.to_string() == locked.player1_wallet {
          locked.player1_id
        } else {
          locked
            .player2_id
            .ok_or_else(|| anyhow::anyhow!("resolved duel {} missing player 2", locked.id))?
        };
        let (payout, fee) = payout_split(locked.bet_amount, PLATFORM_FEE_BPS)
          .ok_or_else(|| anyhow::anyhow!("payout overflow for duel {}", locked.id))?;
        let outcome = ResolutionOutcome {
          exit_price: onchain.exit_price,
          winner_id: Some(winner_id),
          payout,
          fee,
          resolution_tx_hash: None,
        };
        Ledger::apply_resolution(tx, locked, &outcome).await?;
        info!("duel {} reconciled from chain as resolved", locked.id);
        Ok(true)
      }
      OnchainStatus::Cancelled => {
        let outcome = ResolutionOutcome {
          exit_price: onchain.exit_price,
          winner_id: None,
          payout: 0,
          fee: 0,
          resolution_tx_hash: None,
        };
        Ledger::apply_resolution(tx, locked, &outcome).await?;
        info!("duel {} reconciled from chain as cancelled", locked.id);
        Ok(true)
      }
      _ => Ok(false),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use common::Direction;

  #[test]
  fn resolution_duration_boundary() {
    // A duel is due exactly DUEL_DURATION after its live timestamp.
    let started = Utc::now() - ChronoDuration::from_std(DUEL_DURATION).unwrap();
    assert!(started + ChronoDuration::from_std(DUEL_DURATION).unwrap() <= Utc::now());
  }

  #[test]
  fn happy_path_payout_numbers() {
    // bet 10_000_000 each side, P1 on Up, price climbs: P1 takes 19_000_000.
    let winner = winner_for(100_00000000, 101_00000000, Direction::Up).unwrap();
    assert_eq!(winner, DuelWinner::Player1);
    let (payout, fee) = payout_split(10_000_000, PLATFORM_FEE_BPS).unwrap();
    assert_eq!(payout, 19_000_000);
    assert_eq!(fee, 1_000_000);
  }

  #[test]
  fn backoff_delays_double() {
    let delays: Vec<u64> = (1..=5)
      .map(|attempts: i32| 1u64 << attempts.min(6) as u32)
      .collect();
    assert_eq!(delays, vec![2, 4, 8, 16, 32]);
  }
}
