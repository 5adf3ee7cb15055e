use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use ticker::{PriceTick, SourceCandle};

use crate::error::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CurrentQuery {
  pub symbol: String,
}

#[derive(Deserialize)]
pub struct CandlesQuery {
  pub symbol: String,
  pub interval: Option<String>,
  pub limit: Option<usize>,
}

pub async fn current(
  State(state): State<Arc<AppState>>,
  Query(query): Query<CurrentQuery>,
) -> Result<Json<ApiResponse<PriceTick>>, ApiError> {
  let tick = state.ticker.current(&query.symbol).await?;
  Ok(ApiResponse::ok(tick))
}

pub async fn candles(
  State(state): State<Arc<AppState>>,
  Query(query): Query<CandlesQuery>,
) -> Result<Json<ApiResponse<Vec<SourceCandle>>>, ApiError> {
  let interval = query.interval.as_deref().unwrap_or("1m");
  let limit = query.limit.unwrap_or(100).min(1000);
  let candles = state.ticker.candles(&query.symbol, interval, limit).await?;
  Ok(ApiResponse::ok(candles))
}
