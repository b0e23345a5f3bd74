//! Checkout and payments

mod errors;
pub mod models;
pub mod payments;
mod service;

pub use errors::*;
pub use models::{PaymentMethod, PlacedOrder};
pub use payments::{HttpPaymentsService, MockPaymentsService, PaymentsService};
pub use service::*;
