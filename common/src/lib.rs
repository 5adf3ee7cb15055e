pub use bucket::*;
pub use constants::*;
pub use logger::*;
pub use types::*;

pub mod bucket;
pub mod constants;
pub mod logger;
pub mod types;
