use std::sync::Arc;

use ledger::Ledger;
use ticker::PriceSource;

pub struct AppState {
  pub ledger: Ledger,
  pub ticker: Arc<dyn PriceSource>,
  pub jwt_secret: String,
}
