use std::sync::Arc;

use common::init_logger;
use ledger::Ledger;
use ticker::HttpPriceSource;

use crate::config::GatewayConfig;
use crate::state::AppState;

mod auth;
mod config;
mod error;
mod recorder;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv::dotenv().ok();
  init_logger();

  let config = GatewayConfig::read()?;
  log::info!(
    "starting gateway on {} ({}), amm={}, escrow={}, fee collector={}, fee={}%",
    config.network,
    config.rpc_url,
    config.amm_program,
    config.escrow_program,
    config.fee_collector,
    config.platform_fee_percent,
  );

  let ledger = Ledger::connect(&config.database_url).await?;
  ledger.migrate().await?;

  let ticker = Arc::new(HttpPriceSource::new(config.price_api_url.clone())?);
  let state = Arc::new(AppState {
    ledger,
    ticker,
    jwt_secret: config.jwt_secret.clone(),
  });

  let app = routes::router(state);
  let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
  log::info!("listening on {}", config.bind_addr);
  axum::serve(listener, app).await?;
  Ok(())
}
