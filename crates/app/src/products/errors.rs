//! Products service errors.

use swiftshop::prices::PriceError;
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product not found")]
    NotFound,

    #[error("catalog request failed")]
    Api(#[source] ApiError),

    #[error("invalid price value {0}")]
    InvalidPrice(f64),

    #[error(transparent)]
    Price(#[from] PriceError),

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

impl From<ApiError> for ProductsServiceError {
    fn from(error: ApiError) -> Self {
        if error.is_not_found() {
            return Self::NotFound;
        }

        Self::Api(error)
    }
}
