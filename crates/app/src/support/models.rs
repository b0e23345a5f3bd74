//! Support Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use swiftshop::ids::TypedId;

use crate::{auth::UserId, orders::OrderId, timestamps::server_time};

/// Message Id
pub type MessageId = TypedId<SupportMessage>;

/// Page size for the first fetch and for loading history.
pub const PAGE_LIMIT: u32 = 50;

/// Role the backend records for staff replies.
pub const STAFF_ROLE: &str = "admin";

/// Support message as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportMessage {
    pub id: MessageId,
    pub user_id: UserId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub from_role: String,
    pub text: String,
    #[serde(with = "server_time")]
    pub created_at: Timestamp,
}

impl SupportMessage {
    /// Whether the message was written by staff rather than the customer.
    #[must_use]
    pub fn is_from_staff(&self) -> bool {
        self.from_role == STAFF_ROLE
    }
}

/// Filters for `GET /support/messages`. Unset fields are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_id: Option<MessageId>,
}

impl MessageQuery {
    /// Messages of one conversation: optionally tied to an order, or to a customer for staff.
    #[must_use]
    pub fn conversation(order_id: Option<OrderId>, user_id: Option<UserId>) -> Self {
        Self {
            order_id,
            user_id,
            ..Self::default()
        }
    }

    /// First page of the conversation.
    #[must_use]
    pub fn first_page(self) -> Self {
        Self {
            limit: Some(PAGE_LIMIT),
            after_id: None,
            before_id: None,
            ..self
        }
    }

    /// Messages newer than `id`.
    #[must_use]
    pub fn after(self, id: MessageId) -> Self {
        Self {
            limit: None,
            after_id: Some(id),
            before_id: None,
            ..self
        }
    }

    /// A page of messages older than `id`.
    #[must_use]
    pub fn before(self, id: MessageId) -> Self {
        Self {
            limit: Some(PAGE_LIMIT),
            after_id: None,
            before_id: Some(id),
            ..self
        }
    }
}

/// Body of `POST /support/messages`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub text: String,
    pub order_id: Option<OrderId>,
    /// Recipient when staff write to a customer
    pub target_user_id: Option<UserId>,
    /// Canned answer the server posts back for quick-question cards
    pub auto_reply_text: Option<String>,
}
