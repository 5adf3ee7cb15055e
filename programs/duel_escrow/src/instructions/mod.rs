pub mod cancel_duel;
pub mod create_duel;
pub mod initialize_config;
pub mod join_duel;
pub mod resolve_duel;
pub mod start_duel;

pub use cancel_duel::*;
pub use create_duel::*;
pub use initialize_config::*;
pub use join_duel::*;
pub use resolve_duel::*;
pub use start_duel::*;
