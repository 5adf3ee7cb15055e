pub mod close_pool;
pub mod initialize_pool;
pub mod swap;

pub use close_pool::*;
pub use initialize_pool::*;
pub use swap::*;
