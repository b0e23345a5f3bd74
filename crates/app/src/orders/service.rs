//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use tracing::info;

use crate::{
    api::{ApiClient, ApiError},
    orders::models::{Order, OrderId, OrderRequest, OrderStatus},
};

#[derive(Debug, Clone)]
pub struct HttpOrdersService {
    api: ApiClient,
}

impl HttpOrdersService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl OrdersService for HttpOrdersService {
    async fn create_order(&self, request: OrderRequest) -> Result<Order, ApiError> {
        let order: Order = self.api.post("/orders", &request).await?;

        info!(order_id = %order.id, items = order.items.len(), "order created");

        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.api.get("/orders").await
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, ApiError> {
        let builder = self
            .api
            .request(Method::PUT, &format!("/orders/{id}/status"))?
            .query(&[("status_value", status.as_str())]);

        self.api.execute(builder).await
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.api.delete(&format!("/orders/{id}")).await
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place an order; the server prices it and decrements stock.
    async fn create_order(&self, request: OrderRequest) -> Result<Order, ApiError>;

    /// Orders visible to the caller: their own, or every order for admins.
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// Move an order to another status (admin).
    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, ApiError>;

    /// Delete an order (admin).
    async fn delete_order(&self, id: OrderId) -> Result<(), ApiError>;
}
