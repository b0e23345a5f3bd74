//! Favorites store
//!
//! Local storage is written on every change. When signed in, each toggle is mirrored to the
//! server in the background; a failed mirror is logged and otherwise ignored, and the next
//! hydrate overwrites local state with whatever the server holds.

use std::{fmt, sync::Arc};

use swiftshop::{favorites::FavoriteSet, products::ProductId};
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    api::ApiError,
    auth::Session,
    favorites::FavoritesRemote,
    storage::{FAVORITES_KEY, KeyValueStore, read_json, write_json},
};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("favorite sync request failed")]
    Api(#[from] ApiError),

    #[error("favorite sync task did not complete")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Handle to a background mirror of one toggle. Dropping it detaches the task.
#[derive(Debug)]
pub struct SyncHandle {
    task: JoinHandle<Result<(), ApiError>>,
}

impl SyncHandle {
    /// Wait for the remote call to settle.
    ///
    /// # Errors
    ///
    /// Returns the remote call's error, or [`SyncError::Aborted`] if the task died.
    pub async fn outcome(self) -> Result<(), SyncError> {
        Ok(self.task.await??)
    }
}

/// Result of [`FavoritesStore::toggle_favorite`].
#[derive(Debug)]
pub struct Toggle {
    /// Membership after the toggle
    pub is_favorite: bool,

    /// Background mirror, when signed in
    pub sync: Option<SyncHandle>,
}

pub struct FavoritesStore {
    remote: Arc<dyn FavoritesRemote>,
    storage: Arc<dyn KeyValueStore>,
    favorites: FavoriteSet,
    authenticated: bool,
}

impl fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("favorites", &self.favorites)
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

impl FavoritesStore {
    #[must_use]
    pub fn new(remote: Arc<dyn FavoritesRemote>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            remote,
            storage,
            favorites: FavoriteSet::new(),
            authenticated: false,
        }
    }

    /// Load favourites for a session.
    ///
    /// Signed in, the server's list replaces the local copy. Signed out, the local copy is read;
    /// a missing or corrupt copy gives an empty set.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the server list cannot be fetched. The local copy is loaded
    /// in that case so the store stays usable.
    pub async fn hydrate(&mut self, session: &Session) -> Result<&FavoriteSet, ApiError> {
        self.authenticated = session.is_authenticated();

        if !self.authenticated {
            self.favorites = self.read_local();

            return Ok(&self.favorites);
        }

        match self.remote.list().await {
            Ok(ids) => {
                self.favorites = FavoriteSet::from(ids);
                self.write_local();

                debug!(count = self.favorites.len(), "favorites hydrated from server");

                Ok(&self.favorites)
            }
            Err(error) => {
                warn!("could not fetch favorites, using local copy: {error}");

                self.favorites = self.read_local();

                Err(error)
            }
        }
    }

    /// Check membership.
    #[must_use]
    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.favorites.contains(id)
    }

    /// Current favourites in the order they were added.
    #[must_use]
    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    /// Flip a product's membership.
    ///
    /// The local copy is written before returning. When signed in, the matching add or remove
    /// is sent without waiting for it.
    pub fn toggle_favorite(&mut self, id: ProductId) -> Toggle {
        let is_favorite = self.favorites.toggle(id);

        self.write_local();

        let sync = self.authenticated.then(|| self.mirror(id, is_favorite)).flatten();

        Toggle { is_favorite, sync }
    }

    fn mirror(&self, id: ProductId, is_favorite: bool) -> Option<SyncHandle> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(product_id = %id, "no async runtime, favorite not mirrored");

            return None;
        };

        let remote = Arc::clone(&self.remote);

        let task = runtime.spawn(async move {
            let result = if is_favorite {
                remote.add(id).await
            } else {
                remote.remove(id).await
            };

            if let Err(error) = &result {
                warn!(product_id = %id, is_favorite, "favorite sync failed: {error}");
            }

            result
        });

        Some(SyncHandle { task })
    }

    fn read_local(&self) -> FavoriteSet {
        match read_json::<FavoriteSet>(self.storage.as_ref(), FAVORITES_KEY) {
            Ok(favorites) => favorites.unwrap_or_default(),
            Err(error) => {
                warn!("discarding unreadable local favorites: {error}");

                FavoriteSet::new()
            }
        }
    }

    fn write_local(&self) {
        if let Err(error) = write_json(self.storage.as_ref(), FAVORITES_KEY, &self.favorites) {
            warn!("could not save favorites locally: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        auth::AuthToken,
        favorites::MockFavoritesRemote,
        storage::{MemoryStore, MockKeyValueStore, StorageError},
        test::fixtures,
    };

    fn signed_in() -> Session {
        Session {
            token: Some(AuthToken::new("tok")),
            ..Session::default()
        }
    }

    fn ids(raw: &[u64]) -> Vec<ProductId> {
        raw.iter().copied().map(ProductId::new).collect()
    }

    fn stored(storage: &MemoryStore) -> Result<Vec<ProductId>, StorageError> {
        Ok(read_json(storage, FAVORITES_KEY)?.unwrap_or_default())
    }

    #[tokio::test]
    async fn signed_out_hydrate_reads_local_copy() -> TestResult {
        let storage = Arc::new(MemoryStore::new());
        write_json(storage.as_ref(), FAVORITES_KEY, &ids(&[3, 1]))?;

        let mut remote = MockFavoritesRemote::new();
        remote.expect_list().never();

        let mut store = FavoritesStore::new(Arc::new(remote), storage);
        let favorites = store.hydrate(&Session::default()).await?;

        assert_eq!(favorites.iter().collect::<Vec<_>>(), ids(&[3, 1]));

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_local_copy_hydrates_empty() -> TestResult {
        let storage = Arc::new(MemoryStore::new());
        storage.set(FAVORITES_KEY, "{not json")?;

        let mut store = FavoritesStore::new(Arc::new(MockFavoritesRemote::new()), storage);

        assert!(store.hydrate(&Session::default()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn signed_in_hydrate_overwrites_local_copy() -> TestResult {
        let storage = Arc::new(MemoryStore::new());
        write_json(storage.as_ref(), FAVORITES_KEY, &ids(&[99]))?;

        let mut remote = MockFavoritesRemote::new();
        remote.expect_list().times(1).returning(|| Ok(ids(&[5, 6])));

        let mut store = FavoritesStore::new(Arc::new(remote), storage.clone());
        store.hydrate(&signed_in()).await?;

        assert!(store.is_favorite(ProductId::new(5)));
        assert!(!store.is_favorite(ProductId::new(99)));
        assert_eq!(stored(&storage)?, ids(&[5, 6]));

        Ok(())
    }

    #[tokio::test]
    async fn failed_remote_hydrate_keeps_local_copy() -> TestResult {
        let storage = Arc::new(MemoryStore::new());
        write_json(storage.as_ref(), FAVORITES_KEY, &ids(&[7]))?;

        let mut remote = MockFavoritesRemote::new();
        remote
            .expect_list()
            .returning(|| Err(fixtures::status_error(500)));

        let mut store = FavoritesStore::new(Arc::new(remote), storage.clone());

        assert!(store.hydrate(&signed_in()).await.is_err());
        assert!(store.is_favorite(ProductId::new(7)));
        assert_eq!(stored(&storage)?, ids(&[7]));

        Ok(())
    }

    #[tokio::test]
    async fn signed_out_toggle_is_local_only() -> TestResult {
        let storage = Arc::new(MemoryStore::new());

        let mut remote = MockFavoritesRemote::new();
        remote.expect_add().never();
        remote.expect_remove().never();

        let mut store = FavoritesStore::new(Arc::new(remote), storage.clone());
        store.hydrate(&Session::default()).await?;

        let toggle = store.toggle_favorite(ProductId::new(4));

        assert!(toggle.is_favorite);
        assert!(toggle.sync.is_none());
        assert_eq!(stored(&storage)?, ids(&[4]));

        let toggle = store.toggle_favorite(ProductId::new(4));

        assert!(!toggle.is_favorite);
        assert!(stored(&storage)?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn signed_in_toggle_mirrors_to_server() -> TestResult {
        let mut remote = MockFavoritesRemote::new();
        remote.expect_list().returning(|| Ok(Vec::new()));
        remote
            .expect_add()
            .withf(|id| *id == ProductId::new(8))
            .times(1)
            .returning(|_| Ok(()));
        remote
            .expect_remove()
            .withf(|id| *id == ProductId::new(8))
            .times(1)
            .returning(|_| Ok(()));

        let mut store = FavoritesStore::new(Arc::new(remote), Arc::new(MemoryStore::new()));
        store.hydrate(&signed_in()).await?;

        let added = store.toggle_favorite(ProductId::new(8));
        added.sync.ok_or("expected a sync handle")?.outcome().await?;

        let removed = store.toggle_favorite(ProductId::new(8));
        removed.sync.ok_or("expected a sync handle")?.outcome().await?;

        assert!(!store.is_favorite(ProductId::new(8)));

        Ok(())
    }

    #[tokio::test]
    async fn failed_mirror_leaves_local_state_alone() -> TestResult {
        let storage = Arc::new(MemoryStore::new());

        let mut remote = MockFavoritesRemote::new();
        remote.expect_list().returning(|| Ok(Vec::new()));
        remote
            .expect_add()
            .returning(|_| Err(fixtures::status_error(503)));

        let mut store = FavoritesStore::new(Arc::new(remote), storage.clone());
        store.hydrate(&signed_in()).await?;

        let toggle = store.toggle_favorite(ProductId::new(2));
        let outcome = toggle.sync.ok_or("expected a sync handle")?.outcome().await;

        assert!(matches!(outcome, Err(SyncError::Api(_))));
        assert!(store.is_favorite(ProductId::new(2)));
        assert_eq!(stored(&storage)?, ids(&[2]));

        Ok(())
    }

    #[tokio::test]
    async fn local_write_failures_are_swallowed() {
        let mut storage = MockKeyValueStore::new();
        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .returning(|_, _| Err(StorageError::Poisoned));

        let mut store = FavoritesStore::new(Arc::new(MockFavoritesRemote::new()), Arc::new(storage));

        assert!(store.toggle_favorite(ProductId::new(1)).is_favorite);
        assert!(store.is_favorite(ProductId::new(1)));
    }
}
