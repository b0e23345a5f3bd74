//! Message poller
//!
//! Fetches the first page of a conversation, then repeatedly fetches messages newer than the
//! last one seen. A cycle waits for its fetch to settle before sleeping again, so fetches never
//! overlap.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, warn};

use crate::support::{
    SupportService,
    models::{MessageId, MessageQuery, SupportMessage},
};

/// Delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

const CHANNEL_CAPACITY: usize = 16;

/// Messages delivered by the poller.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// The conversation's first page, replacing whatever was shown
    FirstPage(Vec<SupportMessage>),

    /// Messages newer than the previous delivery
    Newer(Vec<SupportMessage>),
}

/// Background poll loop for one conversation.
///
/// The loop ends when [`MessagePoller::stop`] is called, the poller is dropped, or the event
/// receiver is dropped. Nothing is delivered once any of these has happened.
#[derive(Debug)]
pub struct MessagePoller {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MessagePoller {
    /// Start polling on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn(
        service: Arc<dyn SupportService>,
        conversation: MessageQuery,
        interval: Duration,
    ) -> (Self, mpsc::Receiver<PollEvent>) {
        let (events, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let (stop, stopped) = watch::channel(false);

        let task = tokio::spawn(poll_loop(service, conversation, interval, events, stopped));

        (Self { stop, task }, receiver)
    }

    /// Ask the loop to stop. An in-flight fetch is abandoned and its result dropped.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Whether the loop has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop and wait for the loop to end.
    pub async fn shutdown(self) {
        self.stop();

        if let Err(error) = self.task.await {
            warn!("support poller ended abnormally: {error}");
        }
    }
}

async fn poll_loop(
    service: Arc<dyn SupportService>,
    conversation: MessageQuery,
    interval: Duration,
    events: mpsc::Sender<PollEvent>,
    mut stopped: watch::Receiver<bool>,
) {
    let mut last_seen: Option<MessageId> = None;
    let mut awaiting_first_page = true;
    let mut started = false;

    loop {
        if started {
            tokio::select! {
                biased;
                _ = stopped.wait_for(|stop| *stop) => break,
                () = events.closed() => break,
                () = sleep(interval) => {}
            }
        }

        started = true;

        let query = match last_seen {
            Some(id) if !awaiting_first_page => conversation.after(id),
            _ => conversation.first_page(),
        };

        let fetched = tokio::select! {
            biased;
            _ = stopped.wait_for(|stop| *stop) => break,
            () = events.closed() => break,
            fetched = service.list_messages(query) => fetched,
        };

        let messages = match fetched {
            Ok(messages) => messages,
            Err(error) => {
                warn!("support poll failed: {error}");

                continue;
            }
        };

        if let Some(newest) = messages.iter().map(|message| message.id).max() {
            last_seen = last_seen.max(Some(newest));
        }

        let event = if awaiting_first_page {
            awaiting_first_page = false;

            PollEvent::FirstPage(messages)
        } else if messages.is_empty() {
            continue;
        } else {
            debug!(count = messages.len(), "new support messages");

            PollEvent::Newer(messages)
        };

        if *stopped.borrow() || events.send(event).await.is_err() {
            break;
        }
    }

    debug!("support poller stopped");
}
