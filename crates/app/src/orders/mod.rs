//! Orders

pub mod models;
pub mod service;

pub use models::{Order, OrderId, OrderItem, OrderRequest, OrderRequestItem, OrderStatus};
pub use service::*;
