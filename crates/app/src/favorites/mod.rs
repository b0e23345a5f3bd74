//! Favorites

mod remote;
mod store;

pub use remote::*;
pub use store::*;
