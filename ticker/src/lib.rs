pub use http::*;
pub use mock::*;
pub use source::*;

pub mod http;
pub mod mock;
pub mod source;
