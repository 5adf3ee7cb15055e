pub use duels::{NewDuel, ResolutionOutcome};
pub use store::*;

pub mod candles;
pub mod duels;
pub mod pools;
pub mod stats;
pub mod store;
pub mod trades;
