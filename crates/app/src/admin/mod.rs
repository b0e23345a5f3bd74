//! Admin back office

pub mod models;
mod service;

pub use service::*;
