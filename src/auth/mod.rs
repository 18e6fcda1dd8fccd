//! Authentication and the current session

mod session;
mod store;
mod types;

pub use session::*;
pub use store::*;
pub use types::*;
