//! Admin service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    admin::models::{NewAdmin, Reports, clamp_days},
    api::{ApiClient, ApiError},
    auth::{User, UserId},
};

#[derive(Debug, Clone)]
pub struct HttpAdminService {
    api: ApiClient,
}

impl HttpAdminService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AdminService for HttpAdminService {
    async fn fetch_reports(&self, days: u32) -> Result<Reports, ApiError> {
        self.api
            .get_with_query("/admin/reports", &[("days", clamp_days(days))])
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.api.get("/users").await
    }

    async fn create_admin_user(&self, admin: NewAdmin) -> Result<User, ApiError> {
        self.api.post("/users/admin", &admin).await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.api.delete(&format!("/users/{id}")).await
    }
}

#[automock]
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Dashboard report over the last `days` days (clamped to 1-365).
    async fn fetch_reports(&self, days: u32) -> Result<Reports, ApiError>;

    /// Every account, ordered by name.
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// Create a staff account.
    async fn create_admin_user(&self, admin: NewAdmin) -> Result<User, ApiError>;

    /// Delete an account.
    async fn delete_user(&self, id: UserId) -> Result<(), ApiError>;
}
