use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use common::{AmmTrade, Market, Pool, PriceCandle};

use crate::auth::AuthedUser;
use crate::error::{ApiError, ApiResponse};
use crate::recorder::{self, TradePayload};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CandleQuery {
  pub limit: Option<i64>,
}

/// Record a confirmed swap. Idempotent on the transaction signature.
pub async fn record_trade(
  State(state): State<Arc<AppState>>,
  _user: AuthedUser,
  Json(payload): Json<TradePayload>,
) -> Result<Json<ApiResponse<AmmTrade>>, ApiError> {
  let trade = recorder::record_trade(&state.ledger, payload).await?;
  Ok(ApiResponse::ok(trade))
}

pub async fn pool_by_market(
  State(state): State<Arc<AppState>>,
  Path(market_id): Path<u16>,
) -> Result<Json<ApiResponse<Pool>>, ApiError> {
  let market = Market::from_id(market_id)
    .ok_or_else(|| ApiError::Validation(format!("unknown market id {market_id}")))?;
  let pool = state
    .ledger
    .get_pool_by_market(market)
    .await?
    .ok_or(ApiError::NotFound("pool"))?;
  Ok(ApiResponse::ok(pool))
}

pub async fn pool_candles(
  State(state): State<Arc<AppState>>,
  Path(pool_id): Path<Uuid>,
  Query(query): Query<CandleQuery>,
) -> Result<Json<ApiResponse<Vec<PriceCandle>>>, ApiError> {
  let limit = query.limit.unwrap_or(500).clamp(1, 1440);
  let candles = state.ledger.candles_for_pool(pool_id, limit).await?;
  Ok(ApiResponse::ok(candles))
}
