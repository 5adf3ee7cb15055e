use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::{Currency, Direction, Duel, DuelResult, Market, PENDING_TTL};
use ledger::NewDuel;

use crate::auth::AuthedUser;
use crate::error::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateDuelBody {
  pub onchain_duel_id: u64,
  pub bet_amount: u64,
  pub currency: Currency,
  pub market_id: u16,
  pub direction: Direction,
  pub stake_mint: String,
  pub wallet: String,
  /// Signature of the confirmed on-chain CreateDuel transaction.
  pub signature: String,
}

#[derive(Deserialize)]
pub struct JoinDuelBody {
  pub wallet: String,
  pub signature: String,
}

#[derive(Deserialize)]
pub struct Pagination {
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

impl Pagination {
  fn limit(&self) -> i64 {
    self.limit.unwrap_or(50).clamp(1, 100)
  }

  fn offset(&self) -> i64 {
    self.offset.unwrap_or(0).max(0)
  }
}

/// A duel plus its result once resolved.
#[derive(Serialize)]
pub struct DuelDetail {
  #[serde(flatten)]
  pub duel: Duel,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<DuelResult>,
}

/// Mirror a confirmed on-chain CreateDuel. The client has already put its
/// stake in escrow; this records the waiting-room row opponents browse.
pub async fn create_duel(
  State(state): State<Arc<AppState>>,
  user: AuthedUser,
  Json(body): Json<CreateDuelBody>,
) -> Result<Json<ApiResponse<Duel>>, ApiError> {
  let market = Market::from_id(body.market_id)
    .ok_or_else(|| ApiError::Validation(format!("unknown market id {}", body.market_id)))?;
  if body.bet_amount < body.currency.min_bet() || body.bet_amount > body.currency.max_bet() {
    return Err(ApiError::Validation(format!(
      "bet must be between {} and {} for {}",
      body.currency.min_bet(),
      body.currency.max_bet(),
      body.currency.as_str()
    )));
  }
  if body.signature.trim().is_empty() {
    return Err(ApiError::Validation("signature required".into()));
  }

  if state
    .ledger
    .get_duel_by_onchain_id(body.onchain_duel_id)
    .await?
    .is_some()
  {
    return Err(ApiError::State(format!(
      "duel {} already recorded",
      body.onchain_duel_id
    )));
  }
  if state
    .ledger
    .has_open_pending_duel(user.user_id, body.bet_amount)
    .await?
  {
    return Err(ApiError::State(
      "an open duel with this stake already exists".into(),
    ));
  }

  let duel = state
    .ledger
    .insert_duel(NewDuel {
      onchain_duel_id: body.onchain_duel_id,
      player1_id: user.user_id,
      player1_wallet: body.wallet,
      stake_mint: body.stake_mint,
      bet_amount: body.bet_amount,
      currency: body.currency,
      market,
      direction_p1: body.direction,
      expires_at: Utc::now() + chrono::Duration::from_std(PENDING_TTL).map_err(anyhow::Error::from)?,
      escrow_tx_hash: body.signature.clone(),
    })
    .await?;

  state
    .ledger
    .record_deposit(duel.id, user.user_id, &body.signature, duel.bet_amount)
    .await?;

  Ok(ApiResponse::ok(duel))
}

pub async fn available_duels(
  State(state): State<Arc<AppState>>,
  Query(page): Query<Pagination>,
) -> Result<Json<ApiResponse<Vec<Duel>>>, ApiError> {
  let duels = state
    .ledger
    .available_duels(page.limit(), page.offset())
    .await?;
  Ok(ApiResponse::ok(duels))
}

/// Mirror a confirmed JoinDuel. The coordinator picks the match up from
/// the Matched state and dispatches the on-chain start.
pub async fn join_duel(
  State(state): State<Arc<AppState>>,
  user: AuthedUser,
  Path(id): Path<Uuid>,
  Json(body): Json<JoinDuelBody>,
) -> Result<Json<ApiResponse<Duel>>, ApiError> {
  if body.signature.trim().is_empty() {
    return Err(ApiError::Validation("signature required".into()));
  }

  let duel = state
    .ledger
    .get_duel(id)
    .await?
    .ok_or(ApiError::NotFound("duel"))?;
  if duel.player1_id == user.user_id {
    return Err(ApiError::Forbidden);
  }

  let joined = state
    .ledger
    .join_duel(id, user.user_id, &body.wallet)
    .await?
    .ok_or_else(|| ApiError::State("duel is no longer joinable".into()))?;

  state
    .ledger
    .record_deposit(joined.id, user.user_id, &body.signature, joined.bet_amount)
    .await?;

  Ok(ApiResponse::ok(joined))
}

pub async fn get_duel(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DuelDetail>>, ApiError> {
  let duel = state
    .ledger
    .get_duel(id)
    .await?
    .ok_or(ApiError::NotFound("duel"))?;
  let result = state.ledger.get_duel_result(id).await?;
  Ok(ApiResponse::ok(DuelDetail { duel, result }))
}

pub async fn duels_for_user(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<Uuid>,
  Query(page): Query<Pagination>,
) -> Result<Json<ApiResponse<Vec<Duel>>>, ApiError> {
  let duels = state
    .ledger
    .duels_for_user(user_id, page.limit(), page.offset())
    .await?;
  Ok(ApiResponse::ok(duels))
}
