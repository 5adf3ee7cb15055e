pub use candle::*;
pub use duel::*;
pub use market::*;
pub use pool::*;
pub use trade::*;

pub mod candle;
pub mod duel;
pub mod market;
pub mod pool;
pub mod trade;
