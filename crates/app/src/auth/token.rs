//! Session token handling.

use std::fmt;

use zeroize::Zeroizing;

/// Bearer token issued at login. Wiped from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    secret: Zeroizing<String>,
}

impl AuthToken {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.secret.as_str()
    }

    /// Whether the token is blank and therefore unusable.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.secret.trim().is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let token = AuthToken::new("eyJhbGciOi.secret");

        assert_eq!(format!("{token:?}"), r#"AuthToken("<redacted>")"#);
        assert_eq!(token.as_str(), "eyJhbGciOi.secret");
    }

    #[test]
    fn blank_tokens_are_detected() {
        assert!(AuthToken::new("  ").is_blank());
        assert!(!AuthToken::new("abc").is_blank());
    }
}
