//! Storefront REST API

mod client;
mod errors;

pub use client::{ApiClient, ApiConfig, DEFAULT_TIMEOUT};
pub use errors::ApiError;
