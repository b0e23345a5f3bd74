//! Session errors.

use thiserror::Error;

use crate::{api::ApiError, storage::StorageError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("authentication request failed")]
    Api(#[from] ApiError),

    #[error("could not persist session token")]
    Storage(#[from] StorageError),

    #[error("server issued an empty token")]
    EmptyToken,
}
