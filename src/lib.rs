//! SwiftShop
//!
//! Client-side storefront domain: the session cart, coupon and shipping pricing, and the
//! favourites set. Everything in this crate is synchronous and free of I/O; the remote catalog,
//! orders and favourites endpoints live in `swiftshop-app`.

pub mod cart;
pub mod coupons;
pub mod favorites;
pub mod ids;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod summary;
