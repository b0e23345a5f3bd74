//! Session store
//!
//! Owns the signed-in state: the bearer token persisted in local storage and the profile fetched
//! for it.

use std::{fmt, sync::Arc};

use tracing::{info, warn};

use crate::{
    auth::{
        AuthService, AuthToken, SessionError,
        models::{Credentials, NewAccount, ProfileUpdate, User, UserId, UserRole},
    },
    storage::{KeyValueStore, TOKEN_KEY, read_json, write_json},
};

/// Snapshot of who is signed in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<AuthToken>,
    pub user_id: Option<UserId>,
    pub role: Option<UserRole>,
    pub user: Option<User>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(UserRole::Admin)
    }
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn KeyValueStore>,
    session: Session,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage", &self.storage)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthService>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            auth,
            storage,
            session: Session::default(),
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Restore a session from the stored token at start-up.
    ///
    /// A missing or unreadable token leaves the session signed out; a token the server rejects
    /// is cleared.
    pub async fn restore(&mut self) -> &Session {
        let token = match read_json::<String>(self.storage.as_ref(), TOKEN_KEY) {
            Ok(token) => token.map(AuthToken::new),
            Err(error) => {
                warn!("could not read stored token: {error}");
                None
            }
        };

        if let Some(token) = token.filter(|token| !token.is_blank()) {
            self.session.token = Some(token);
            self.refresh_me().await;
        }

        &self.session
    }

    /// Refresh the profile for the current token.
    ///
    /// Returns whether the session is still signed in. Any failure signs the session out rather
    /// than surfacing an error.
    pub async fn refresh_me(&mut self) -> bool {
        if self.session.token.is_none() {
            return false;
        }

        match self.auth.me().await {
            Ok(user) => {
                self.session.user_id = Some(user.id);
                self.session.role = Some(user.role);
                self.session.user = Some(user);

                true
            }
            Err(error) => {
                warn!("stored token rejected, signing out: {error}");

                if let Err(error) = self.clear() {
                    warn!("could not clear stored token: {error}");
                }

                false
            }
        }
    }

    /// Sign in and persist the token.
    ///
    /// # Errors
    ///
    /// Returns an error when the credentials are rejected or the token cannot be stored.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, SessionError> {
        let response = self
            .auth
            .login(Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let token = AuthToken::new(response.access_token);

        if token.is_blank() {
            return Err(SessionError::EmptyToken);
        }

        write_json(self.storage.as_ref(), TOKEN_KEY, token.as_str())?;

        self.session = Session {
            token: Some(token),
            user_id: Some(response.user_id),
            role: Some(response.role),
            user: None,
        };

        info!(user_id = %response.user_id, "signed in");

        self.refresh_me().await;

        Ok(&self.session)
    }

    /// Create an account and sign straight in.
    ///
    /// # Errors
    ///
    /// Returns an error when registration or the follow-up login fails.
    pub async fn register(&mut self, account: NewAccount) -> Result<&Session, SessionError> {
        let email = account.email.clone();
        let password = account.password.clone();

        self.auth.register(account).await?;

        self.login(&email, &password).await
    }

    /// Update the signed-in profile.
    ///
    /// # Errors
    ///
    /// Returns an error when the server rejects the update.
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<&User, SessionError> {
        let user = self.auth.update_me(update).await?;

        Ok(self.session.user.insert(user))
    }

    /// Sign out and forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored token cannot be removed.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.clear()?;

        info!("signed out");

        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.session = Session::default();
        self.storage.remove(TOKEN_KEY)?;

        Ok(())
    }
}
