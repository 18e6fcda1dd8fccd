//! Products: types, list filters and the product store

mod filter;
mod store;
mod types;

pub use filter::*;
pub use store::*;
pub use types::*;
