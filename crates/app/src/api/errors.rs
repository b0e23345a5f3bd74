//! API errors.

use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport, timeout or body decoding failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {}", .detail.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The request URL could not be built from the configured base URL.
    #[error("invalid request url: {0}")]
    Url(String),

    /// The stored session token could not be read.
    #[error("local storage error")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Whether the server rejected the credentials or token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN,
                ..
            }
        )
    }

    /// Whether the requested resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }

    /// Message suitable for an alert: the server's detail when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_covers_401_and_403() {
        let unauthorized = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            detail: None,
        };
        let forbidden = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            detail: None,
        };

        assert!(unauthorized.is_unauthorized());
        assert!(forbidden.is_unauthorized());
        assert!(!forbidden.is_not_found());
    }

    #[test]
    fn user_message_prefers_server_detail() {
        let error = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            detail: Some("Estoque insuficiente".to_string()),
        };

        assert_eq!(error.user_message(), "Estoque insuficiente");
        assert!(ApiError::Url("x".to_string()).user_message().contains("invalid"));
    }
}
