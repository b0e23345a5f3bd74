//! SwiftShop client application layer: REST collaborators, local storage, session handling,
//! favourites mirroring, checkout and support messaging.

pub mod admin;
pub mod api;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod context;
pub mod favorites;
pub mod logging;
pub mod orders;
pub mod products;
pub mod storage;
pub mod support;
pub mod timestamps;

#[cfg(test)]
mod test;
