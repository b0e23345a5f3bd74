//! Support service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    api::{ApiClient, ApiError},
    support::models::{MessageQuery, NewMessage, SupportMessage},
};

#[derive(Debug, Clone)]
pub struct HttpSupportService {
    api: ApiClient,
}

impl HttpSupportService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SupportService for HttpSupportService {
    async fn list_messages(&self, query: MessageQuery) -> Result<Vec<SupportMessage>, ApiError> {
        self.api.get_with_query("/support/messages", &query).await
    }

    async fn send_message(&self, message: NewMessage) -> Result<SupportMessage, ApiError> {
        self.api.post("/support/messages", &message).await
    }
}

#[automock]
#[async_trait]
pub trait SupportService: Send + Sync {
    /// Messages matching the query, oldest first.
    async fn list_messages(&self, query: MessageQuery) -> Result<Vec<SupportMessage>, ApiError>;

    /// Post a message.
    async fn send_message(&self, message: NewMessage) -> Result<SupportMessage, ApiError>;
}
