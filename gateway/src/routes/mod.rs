use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub mod amm;
pub mod duels;
pub mod price;

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/api/duels", post(duels::create_duel))
    .route("/api/duels/available", get(duels::available_duels))
    .route("/api/duels/{id}", get(duels::get_duel))
    .route("/api/duels/{id}/join", post(duels::join_duel))
    .route("/api/duels/user/{user_id}", get(duels::duels_for_user))
    .route("/api/amm/trades", post(amm::record_trade))
    .route("/api/amm/pools/market/{market_id}", get(amm::pool_by_market))
    .route("/api/amm/prices/{pool_id}", get(amm::pool_candles))
    .route("/api/price/candles", get(price::candles))
    .route("/api/price/current", get(price::current))
    .layer(CorsLayer::permissive())
    .with_state(state)
}
