use std::sync::Arc;

use common::{init_logger, RPC_TIMEOUT};
use ledger::Ledger;
use relay::RelayClient;
use ticker::HttpPriceSource;

use crate::config::MarshalConfig;
use crate::marshal::Marshal;

mod config;
mod marshal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv::dotenv().ok();
  init_logger();

  let config = MarshalConfig::read()?;
  log::info!(
    "starting marshal on {} ({}), escrow={}, amm={}, platform fee {}%",
    config.network,
    config.rpc_url,
    config.escrow_program,
    config.amm_program,
    config.platform_fee_percent,
  );

  let ledger = Ledger::connect(&config.database_url).await?;
  ledger.migrate().await?;

  let relay = Arc::new(RelayClient::new(
    config.rpc_url.clone(),
    config.signer,
    config.escrow_program,
    config.amm_program,
    config.fee_collector,
    RPC_TIMEOUT,
  ));
  let ticker = Arc::new(HttpPriceSource::new(config.price_api_url.clone())?);

  Marshal::new(ledger, relay, ticker).run().await
}
