//! Remote favorites collaborator.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use swiftshop::products::ProductId;

use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct HttpFavoritesRemote {
    api: ApiClient,
}

impl HttpFavoritesRemote {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl FavoritesRemote for HttpFavoritesRemote {
    async fn list(&self) -> Result<Vec<ProductId>, ApiError> {
        self.api.get("/favorites").await
    }

    async fn add(&self, id: ProductId) -> Result<(), ApiError> {
        let builder = self.api.request(Method::POST, &format!("/favorites/{id}"))?;

        self.api.execute_unit(builder).await
    }

    async fn remove(&self, id: ProductId) -> Result<(), ApiError> {
        self.api.delete(&format!("/favorites/{id}")).await
    }
}

#[automock]
#[async_trait]
pub trait FavoritesRemote: Send + Sync {
    /// The signed-in user's favourite product ids.
    async fn list(&self) -> Result<Vec<ProductId>, ApiError>;

    /// Mark a product as favourite.
    async fn add(&self, id: ProductId) -> Result<(), ApiError>;

    /// Unmark a product.
    async fn remove(&self, id: ProductId) -> Result<(), ApiError>;
}
