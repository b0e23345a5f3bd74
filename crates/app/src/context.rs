//! App Context

use std::{fmt, sync::Arc};

use rusty_money::iso;
use swiftshop::pricing::PricingCalculator;
use thiserror::Error;

use crate::{
    admin::{AdminService, HttpAdminService},
    api::{ApiClient, ApiError},
    auth::{AuthService, HttpAuthService, SessionStore},
    checkout::{Checkout, HttpPaymentsService, PaymentsService},
    config::ClientConfig,
    favorites::{FavoritesRemote, FavoritesStore, HttpFavoritesRemote},
    orders::{HttpOrdersService, OrdersService},
    products::{HttpProductsService, ProductsService},
    storage::{JsonFileStore, KeyValueStore, StorageError},
    support::{HttpSupportService, MessagePoller, MessageQuery, MessageThread, PollEvent, SupportService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to open local storage")]
    Storage(#[source] StorageError),

    #[error("failed to build api client")]
    Api(#[source] ApiError),
}

/// Shared collaborators for one client process.
#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub storage: Arc<dyn KeyValueStore>,
    pub auth: Arc<dyn AuthService>,
    pub products: Arc<dyn ProductsService>,
    pub orders: Arc<dyn OrdersService>,
    pub favorites: Arc<dyn FavoritesRemote>,
    pub payments: Arc<dyn PaymentsService>,
    pub support: Arc<dyn SupportService>,
    pub admin: Arc<dyn AdminService>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from configuration, opening the file-backed store.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage file cannot be read or the HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> Result<Self, AppInitError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(
            JsonFileStore::open(config.storage_path.clone()).map_err(AppInitError::Storage)?,
        );

        Self::with_storage(config, storage)
    }

    /// Build application context over an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppInitError> {
        let api = ApiClient::new(&config.api_config(), Arc::clone(&storage))
            .map_err(AppInitError::Api)?;

        Ok(Self {
            storage,
            auth: Arc::new(HttpAuthService::new(api.clone())),
            products: Arc::new(HttpProductsService::new(api.clone())),
            orders: Arc::new(HttpOrdersService::new(api.clone())),
            favorites: Arc::new(HttpFavoritesRemote::new(api.clone())),
            payments: Arc::new(HttpPaymentsService::new(api.clone())),
            support: Arc::new(HttpSupportService::new(api.clone())),
            admin: Arc::new(HttpAdminService::new(api)),
            config,
        })
    }

    /// Session store over this context's auth service and storage.
    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(Arc::clone(&self.auth), Arc::clone(&self.storage))
    }

    /// Favourites store over this context's remote and storage.
    #[must_use]
    pub fn favorites_store(&self) -> FavoritesStore {
        FavoritesStore::new(Arc::clone(&self.favorites), Arc::clone(&self.storage))
    }

    /// Checkout priced in meticais with the configured exchange rate.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(
            PricingCalculator::with_defaults(iso::MZN),
            Arc::clone(&self.orders),
            Arc::clone(&self.payments),
        )
        .with_usd_rate(self.config.usd_rate)
    }

    /// Support thread for the caller, optionally about one order.
    #[must_use]
    pub fn message_thread(&self, conversation: MessageQuery) -> MessageThread {
        MessageThread::new(Arc::clone(&self.support), conversation)
    }

    /// Start polling a support conversation at the configured interval.
    #[must_use]
    pub fn message_poller(
        &self,
        conversation: MessageQuery,
    ) -> (MessagePoller, tokio::sync::mpsc::Receiver<PollEvent>) {
        MessagePoller::spawn(
            Arc::clone(&self.support),
            conversation,
            self.config.poll_interval(),
        )
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;
    use crate::{
        auth::UserId,
        storage::{MemoryStore, TOKEN_KEY, write_json},
        support::MockSupportService,
        test::fixtures,
    };

    #[tokio::test]
    async fn session_store_shares_context_storage() -> TestResult {
        let storage = Arc::new(MemoryStore::new());
        write_json(storage.as_ref(), TOKEN_KEY, "tok")?;

        let config = ClientConfig::try_parse_from(["swiftshop", "--api-url", "http://127.0.0.1:9"])?;
        let context = AppContext::with_storage(config, storage.clone())?;

        context.session_store().logout()?;

        assert_eq!(storage.get(TOKEN_KEY)?, None);

        Ok(())
    }

    #[test]
    fn file_backed_context_opens_storage() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("storage.json");
        let path = path.to_str().ok_or("non-utf8 temp path")?;

        let config = ClientConfig::try_parse_from(["swiftshop", "--storage-path", path])?;
        let context = AppContext::from_config(config)?;

        assert!(context.checkout().pricing().coupons().lookup("SWIFT10").is_some());

        Ok(())
    }

    #[tokio::test]
    async fn message_thread_keeps_customer_scope() -> TestResult {
        let mut support = MockSupportService::new();
        support
            .expect_send_message()
            .withf(|message| message.target_user_id == Some(UserId::new(7)))
            .times(1)
            .returning(|message| Ok(fixtures::message(4, "admin", &message.text)));

        let config = ClientConfig::try_parse_from(["swiftshop"])?;
        let mut context = AppContext::with_storage(config, Arc::new(MemoryStore::new()))?;
        context.support = Arc::new(support);

        let mut thread =
            context.message_thread(MessageQuery::conversation(None, Some(UserId::new(7))));

        thread.send("hi", None).await.ok_or("blank")??;

        Ok(())
    }
}
