pub use duel_escrow;
pub use outcome_amm;

pub use client::*;
pub use ixs::*;
pub use pdas::*;
pub use trx_builder::*;
pub use utils::*;

pub mod client;
pub mod ixs;
pub mod pdas;
pub mod trx_builder;
pub mod utils;
