//! Message thread
//!
//! The conversation as the customer sees it: server messages plus their own messages that are
//! still sending or failed to send.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use tracing::warn;

use crate::{
    api::ApiError,
    support::{
        PollEvent, SupportService,
        models::{MessageId, MessageQuery, NewMessage, SupportMessage},
    },
};

/// Greeting shown while a conversation has no messages.
pub const WELCOME_TEXT: &str = "Olá! Como posso ajudar você hoje?";

/// Who wrote an entry, from the customer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    Me,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Sending,
    Failed,
    Delivered,
}

/// Identity of an entry in the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKey {
    /// Message the server has stored
    Server(MessageId),

    /// Own message not yet acknowledged by the server
    Local(u64),

    /// Greeting placeholder
    Welcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadEntry {
    pub key: EntryKey,
    pub author: Author,
    pub text: String,
    pub at: Option<Timestamp>,
    pub state: DeliveryState,
}

impl ThreadEntry {
    fn welcome() -> Self {
        Self {
            key: EntryKey::Welcome,
            author: Author::Agent,
            text: WELCOME_TEXT.to_string(),
            at: None,
            state: DeliveryState::Delivered,
        }
    }
}

impl From<SupportMessage> for ThreadEntry {
    fn from(message: SupportMessage) -> Self {
        Self {
            key: EntryKey::Server(message.id),
            author: if message.is_from_staff() {
                Author::Agent
            } else {
                Author::Me
            },
            text: message.text,
            at: Some(message.created_at),
            state: DeliveryState::Delivered,
        }
    }
}

pub struct MessageThread {
    service: Arc<dyn SupportService>,
    conversation: MessageQuery,
    entries: Vec<ThreadEntry>,
    welcome: ThreadEntry,
    has_more_older: bool,
    next_local: u64,
}

impl fmt::Debug for MessageThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageThread")
            .field("conversation", &self.conversation)
            .field("entries", &self.entries)
            .field("has_more_older", &self.has_more_older)
            .finish_non_exhaustive()
    }
}

impl MessageThread {
    /// Thread for one conversation. Only its order and customer scope is kept; paging fields
    /// are ignored.
    #[must_use]
    pub fn new(service: Arc<dyn SupportService>, conversation: MessageQuery) -> Self {
        Self {
            service,
            conversation: MessageQuery::conversation(conversation.order_id, conversation.user_id),
            entries: Vec::new(),
            welcome: ThreadEntry::welcome(),
            has_more_older: true,
            next_local: 0,
        }
    }

    /// Entries to display; the welcome greeting when there are none.
    #[must_use]
    pub fn entries(&self) -> &[ThreadEntry] {
        if self.entries.is_empty() {
            return std::slice::from_ref(&self.welcome);
        }

        &self.entries
    }

    /// Entry by key.
    #[must_use]
    pub fn entry(&self, key: EntryKey) -> Option<&ThreadEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Whether older history may still be available.
    #[must_use]
    pub fn has_more_older(&self) -> bool {
        self.has_more_older
    }

    /// Newest server message id seen.
    #[must_use]
    pub fn last_server_id(&self) -> Option<MessageId> {
        self.server_ids().max()
    }

    /// Oldest server message id seen.
    #[must_use]
    pub fn oldest_server_id(&self) -> Option<MessageId> {
        self.server_ids().min()
    }

    /// Apply a poll result.
    pub fn apply(&mut self, event: PollEvent) {
        match event {
            PollEvent::FirstPage(messages) => {
                let pending = self.take_pending();

                self.entries = messages.into_iter().map(ThreadEntry::from).collect();
                self.entries.extend(pending);
            }
            PollEvent::Newer(messages) => self.append(messages),
        }
    }

    /// Send a message, showing it immediately as `Sending`.
    ///
    /// Blank text is ignored and returns `None`. On failure the entry stays in the thread as
    /// `Failed` so it can be retried.
    pub async fn send(
        &mut self,
        text: &str,
        auto_reply_text: Option<String>,
    ) -> Option<Result<EntryKey, ApiError>> {
        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        self.next_local += 1;

        let key = EntryKey::Local(self.next_local);

        self.entries.push(ThreadEntry {
            key,
            author: Author::Me,
            text: text.to_string(),
            at: Some(Timestamp::now()),
            state: DeliveryState::Sending,
        });

        Some(self.deliver(key, auto_reply_text).await)
    }

    /// Resend one of the customer's failed messages.
    ///
    /// Entries that are not own failed messages are left alone and `None` is returned.
    pub async fn retry(&mut self, key: EntryKey) -> Option<Result<EntryKey, ApiError>> {
        let entry = self.entry_mut(key)?;

        if entry.author != Author::Me || entry.state != DeliveryState::Failed {
            return None;
        }

        entry.state = DeliveryState::Sending;

        Some(self.deliver(key, None).await)
    }

    /// Load a page of history before the oldest message shown.
    ///
    /// Returns the number of messages added. A page with nothing new marks the history as
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns the server's error; the thread is left unchanged.
    pub async fn load_older(&mut self) -> Result<usize, ApiError> {
        if !self.has_more_older {
            return Ok(0);
        }

        let query = match self.oldest_server_id() {
            Some(oldest) => self.conversation.before(oldest),
            None => self.conversation.first_page(),
        };

        let messages = self.service.list_messages(query).await?;

        let older: Vec<ThreadEntry> = messages
            .into_iter()
            .filter(|message| self.entry(EntryKey::Server(message.id)).is_none())
            .map(ThreadEntry::from)
            .collect();

        let added = older.len();

        if added == 0 {
            self.has_more_older = false;

            return Ok(0);
        }

        self.entries.splice(0..0, older);

        Ok(added)
    }

    async fn deliver(
        &mut self,
        key: EntryKey,
        auto_reply_text: Option<String>,
    ) -> Result<EntryKey, ApiError> {
        let text = self
            .entry(key)
            .map(|entry| entry.text.clone())
            .unwrap_or_default();

        let result = self
            .service
            .send_message(NewMessage {
                text,
                order_id: self.conversation.order_id,
                target_user_id: self.conversation.user_id,
                auto_reply_text,
            })
            .await;

        match result {
            Ok(message) => {
                let stored = EntryKey::Server(message.id);
                let duplicate = self.entry(stored).is_some();

                if duplicate {
                    self.entries.retain(|entry| entry.key != key);
                } else if let Some(entry) = self.entry_mut(key) {
                    entry.key = stored;
                    entry.state = DeliveryState::Delivered;
                    entry.at = Some(message.created_at);
                }

                Ok(stored)
            }
            Err(error) => {
                warn!("support message not sent: {error}");

                if let Some(entry) = self.entry_mut(key) {
                    entry.state = DeliveryState::Failed;
                }

                Err(error)
            }
        }
    }

    fn append(&mut self, messages: Vec<SupportMessage>) {
        for message in messages {
            if self.entry(EntryKey::Server(message.id)).is_none() {
                self.entries.push(ThreadEntry::from(message));
            }
        }
    }

    fn take_pending(&mut self) -> Vec<ThreadEntry> {
        let (pending, _delivered) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| matches!(entry.key, EntryKey::Local(_)));

        pending
    }

    fn entry_mut(&mut self, key: EntryKey) -> Option<&mut ThreadEntry> {
        self.entries.iter_mut().find(|entry| entry.key == key)
    }

    fn server_ids(&self) -> impl Iterator<Item = MessageId> {
        self.entries.iter().filter_map(|entry| match entry.key {
            EntryKey::Server(id) => Some(id),
            EntryKey::Local(_) | EntryKey::Welcome => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{auth::UserId, orders::OrderId, support::MockSupportService, test::fixtures};

    fn thread(service: MockSupportService) -> MessageThread {
        MessageThread::new(
            Arc::new(service),
            MessageQuery::conversation(Some(OrderId::new(3)), None),
        )
    }

    #[test]
    fn empty_thread_shows_welcome() {
        let thread = thread(MockSupportService::new());

        assert_eq!(thread.entries().len(), 1);
        assert_eq!(thread.entries()[0].key, EntryKey::Welcome);
        assert_eq!(thread.entries()[0].author, Author::Agent);
    }

    #[test]
    fn poll_events_fill_and_extend_the_thread() {
        let mut thread = thread(MockSupportService::new());

        thread.apply(PollEvent::FirstPage(vec![
            fixtures::message(1, "client", "Oi"),
            fixtures::message(2, "admin", "Olá!"),
        ]));
        thread.apply(PollEvent::Newer(vec![
            fixtures::message(2, "admin", "Olá!"),
            fixtures::message(3, "client", "Onde está o pedido?"),
        ]));

        let authors: Vec<Author> = thread.entries().iter().map(|entry| entry.author).collect();

        assert_eq!(authors, [Author::Me, Author::Agent, Author::Me]);
        assert_eq!(thread.last_server_id(), Some(MessageId::new(3)));
        assert_eq!(thread.oldest_server_id(), Some(MessageId::new(1)));
    }

    #[tokio::test]
    async fn send_marks_delivered_with_server_id() -> TestResult {
        let mut service = MockSupportService::new();
        service
            .expect_send_message()
            .withf(|message| message.text == "Preciso de ajuda" && message.order_id == Some(OrderId::new(3)))
            .times(1)
            .returning(|message| Ok(fixtures::message(10, "client", &message.text)));

        let mut thread = thread(service);
        let key = thread.send("  Preciso de ajuda ", None).await.ok_or("blank")??;

        let entry = thread.entry(key).ok_or("missing entry")?;

        assert_eq!(key, EntryKey::Server(MessageId::new(10)));
        assert_eq!(entry.state, DeliveryState::Delivered);

        Ok(())
    }

    #[tokio::test]
    async fn blank_messages_are_not_sent() {
        let mut service = MockSupportService::new();
        service.expect_send_message().never();

        let mut thread = thread(service);

        assert!(thread.send("   ", None).await.is_none());
        assert_eq!(thread.entries()[0].key, EntryKey::Welcome);
    }

    #[tokio::test]
    async fn failed_send_can_be_retried() -> TestResult {
        let mut service = MockSupportService::new();
        service
            .expect_send_message()
            .times(1)
            .returning(|_| Err(fixtures::status_error(502)));

        let mut thread = thread(service);
        let result = thread.send("Olá", None).await.ok_or("blank")?;

        assert!(result.is_err());

        let failed = thread.entries()[0].clone();

        assert_eq!(failed.state, DeliveryState::Failed);
        assert_eq!(failed.key, EntryKey::Local(1));

        let mut service = MockSupportService::new();
        service
            .expect_send_message()
            .withf(|message| message.text == "Olá" && message.auto_reply_text.is_none())
            .times(1)
            .returning(|message| Ok(fixtures::message(11, "client", &message.text)));
        thread.service = Arc::new(service);

        let key = thread.retry(failed.key).await.ok_or("not retried")??;

        assert_eq!(thread.entry(key).map(|entry| entry.state), Some(DeliveryState::Delivered));
        assert_eq!(thread.entries().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn retry_ignores_delivered_messages() {
        let mut thread = thread(MockSupportService::new());

        thread.apply(PollEvent::FirstPage(vec![fixtures::message(1, "client", "Oi")]));

        assert!(thread.retry(EntryKey::Server(MessageId::new(1))).await.is_none());
    }

    #[tokio::test]
    async fn first_page_keeps_pending_messages() -> TestResult {
        let mut service = MockSupportService::new();
        service
            .expect_send_message()
            .returning(|_| Err(fixtures::status_error(500)));

        let mut thread = thread(service);
        thread.send("pendente", None).await;

        thread.apply(PollEvent::FirstPage(vec![fixtures::message(1, "admin", "Olá")]));

        let keys: Vec<EntryKey> = thread.entries().iter().map(|entry| entry.key).collect();

        assert_eq!(keys, [EntryKey::Server(MessageId::new(1)), EntryKey::Local(1)]);

        Ok(())
    }

    #[tokio::test]
    async fn load_older_prepends_until_exhausted() -> TestResult {
        let mut service = MockSupportService::new();
        service
            .expect_list_messages()
            .withf(|query| query.before_id == Some(MessageId::new(5)) && query.limit == Some(50))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    fixtures::message(3, "client", "a"),
                    fixtures::message(4, "admin", "b"),
                ])
            });
        service
            .expect_list_messages()
            .withf(|query| query.before_id == Some(MessageId::new(3)))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let mut thread = thread(service);
        thread.apply(PollEvent::FirstPage(vec![fixtures::message(5, "client", "c")]));

        assert_eq!(thread.load_older().await?, 2);
        assert_eq!(thread.oldest_server_id(), Some(MessageId::new(3)));
        assert!(thread.has_more_older());

        assert_eq!(thread.load_older().await?, 0);
        assert!(!thread.has_more_older());

        assert_eq!(thread.load_older().await?, 0);
        assert_eq!(thread.entries().len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn customer_conversation_targets_that_customer() -> TestResult {
        let mut service = MockSupportService::new();
        service
            .expect_send_message()
            .withf(|message| {
                message.target_user_id == Some(UserId::new(7)) && message.order_id.is_none()
            })
            .times(1)
            .returning(|message| Ok(fixtures::message(20, "admin", &message.text)));
        service
            .expect_list_messages()
            .withf(|query| {
                query.user_id == Some(UserId::new(7)) && query.before_id == Some(MessageId::new(20))
            })
            .times(1)
            .returning(|_| Ok(vec![fixtures::message(19, "client", "Oi")]));

        let mut thread = MessageThread::new(
            Arc::new(service),
            MessageQuery::conversation(None, Some(UserId::new(7))).first_page(),
        );

        thread.send("Olá, em que posso ajudar?", None).await.ok_or("blank")??;

        assert_eq!(thread.load_older().await?, 1);
        assert_eq!(thread.oldest_server_id(), Some(MessageId::new(19)));

        Ok(())
    }

    #[tokio::test]
    async fn page_of_known_messages_ends_history() -> TestResult {
        let mut service = MockSupportService::new();
        service
            .expect_list_messages()
            .times(1)
            .returning(|_| Ok(vec![fixtures::message(5, "client", "c")]));

        let mut thread = thread(service);
        thread.apply(PollEvent::FirstPage(vec![fixtures::message(5, "client", "c")]));

        assert_eq!(thread.load_older().await?, 0);
        assert!(!thread.has_more_older());
        assert_eq!(thread.entries().len(), 1);

        assert_eq!(thread.load_older().await?, 0);

        Ok(())
    }
}
