//! Auth service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    api::{ApiClient, ApiError},
    auth::models::{Credentials, LoginResponse, NewAccount, ProfileUpdate, User},
};

#[derive(Debug, Clone)]
pub struct HttpAuthService {
    api: ApiClient,
}

impl HttpAuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, credentials: Credentials) -> Result<LoginResponse, ApiError> {
        self.api.post("/auth/login", &credentials).await
    }

    async fn register(&self, account: NewAccount) -> Result<(), ApiError> {
        let _created: serde_json::Value = self.api.post("/auth/register", &account).await?;

        Ok(())
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.api.get("/auth/me").await
    }

    async fn update_me(&self, update: ProfileUpdate) -> Result<User, ApiError> {
        self.api.put("/auth/me", &update).await
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a token.
    async fn login(&self, credentials: Credentials) -> Result<LoginResponse, ApiError>;

    /// Create a new account.
    async fn register(&self, account: NewAccount) -> Result<(), ApiError>;

    /// Profile of the token's owner.
    async fn me(&self) -> Result<User, ApiError>;

    /// Update the caller's profile.
    async fn update_me(&self, update: ProfileUpdate) -> Result<User, ApiError>;
}
