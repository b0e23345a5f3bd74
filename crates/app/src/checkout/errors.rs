//! Checkout errors.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment request failed")]
    Api(#[from] ApiError),

    #[error("exchange rate must be positive, got {0}")]
    InvalidRate(Decimal),

    #[error("payment provider returned no approval link")]
    MissingApprovalLink,

    #[error("approval link is not a valid url: {0}")]
    InvalidApprovalLink(String),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("paypal orders must be approved before they are placed")]
    ApprovalRequired,

    #[error("order could not be created")]
    Order(#[source] ApiError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl CheckoutError {
    /// Message suitable for an alert.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Order(error) | Self::Payment(PaymentError::Api(error)) => error.user_message(),
            other => other.to_string(),
        }
    }
}
