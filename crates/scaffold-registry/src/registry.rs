//! Run-scoped typed registry
//!
//! Provides [`Registry`], the one shared resource of a resolution run.

use crate::error::RegistryError;
use crate::key::RegistryKey;
use crate::wait_graph::{WaitGraph, WaitGuard};
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Type-erased shared value
pub type Erased = Arc<dyn Any + Send + Sync>;

/// One registry slot
///
/// A completed entry is created with its cell already set. A deferred entry
/// carries the pending payload and fills the cell on first fetch. The payload
/// is dropped once the cell is set and kept while initialization fails.
struct Entry {
    cell: OnceCell<Erased>,
    pending: Mutex<Option<Erased>>,
}

/// Statistics for registry monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of registered keys
    pub entries: usize,
    /// Entries holding a value (registered complete or initialized)
    pub completed: usize,
    /// Fetches answered from an already completed entry
    pub hits: u64,
    /// Deferred initializations started
    pub initializations: u64,
    /// Deferred entries currently waiting on others
    pub waiting: usize,
}

/// Concurrency-safe store keyed by (type, string key)
///
/// Each key is written once; registering it again fails and the first
/// registration stays. Deferred entries are initialized at most once even when
/// fetched concurrently: the first fetch runs the initializer and every other
/// fetch awaits the same cell. A failed or cancelled initializer leaves the
/// cell empty so a later fetch can retry.
pub struct Registry {
    entries: DashMap<RegistryKey, Arc<Entry>>,
    waits: Mutex<WaitGraph>,
    hits: AtomicU64,
    initializations: AtomicU64,
}

impl Registry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            waits: Mutex::new(WaitGraph::default()),
            hits: AtomicU64::new(0),
            initializations: AtomicU64::new(0),
        }
    }

    /// Register a completed value
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if the key is taken
    pub fn insert<T>(&self, key: impl Into<Arc<str>>, value: T) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
    {
        self.insert_arc(key, Arc::new(value))
    }

    /// Register a completed, already shared value
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if the key is taken
    pub fn insert_arc<T>(&self, key: impl Into<Arc<str>>, value: Arc<T>) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
    {
        let erased: Erased = value;
        self.insert_entry(
            RegistryKey::of::<T>(key),
            Entry {
                cell: OnceCell::new_with(Some(erased)),
                pending: Mutex::new(None),
            },
        )
    }

    /// Register a deferred entry for values of type `T`
    ///
    /// `pending` is handed to the initializer of the first [`fetch`](Self::fetch).
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if the key is taken
    pub fn insert_deferred<T, P>(&self, key: impl Into<Arc<str>>, pending: P) -> Result<(), RegistryError>
    where
        T: 'static,
        P: Send + Sync + 'static,
    {
        self.insert_entry(
            RegistryKey::of::<T>(key),
            Entry {
                cell: OnceCell::new(),
                pending: Mutex::new(Some(Arc::new(pending))),
            },
        )
    }

    fn insert_entry(&self, key: RegistryKey, entry: Entry) -> Result<(), RegistryError> {
        match self.entries.entry(key) {
            MapEntry::Occupied(occupied) => {
                tracing::warn!(entry = %occupied.key(), "duplicate registration rejected");
                Err(RegistryError::already_registered(occupied.key()))
            }
            MapEntry::Vacant(vacant) => {
                tracing::trace!(entry = %vacant.key(), deferred = entry.pending.lock().is_some(), "registered");
                vacant.insert(Arc::new(entry));
                Ok(())
            }
        }
    }

    /// Check if a `T` is registered under `key`
    #[inline]
    #[must_use]
    pub fn contains<T: 'static>(&self, key: &str) -> bool {
        self.contains_key(&RegistryKey::of::<T>(key))
    }

    /// Check if typed key is registered
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &RegistryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Get a completed value without waiting
    ///
    /// Returns `None` for missing keys and for deferred entries that have not
    /// been initialized yet.
    #[must_use]
    pub fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let key = RegistryKey::of::<T>(key);
        let entry = self.entry(&key)?;
        let value = entry.cell.get()?.clone();
        value.downcast::<T>().ok()
    }

    /// Fetch the value under `key`, initializing a deferred entry if needed
    ///
    /// `waiter` is the deferred entry whose initialization performs this
    /// fetch, if any; it is recorded in the wait graph so that deferred
    /// entries depending on each other fail instead of waiting forever.
    ///
    /// # Errors
    /// - [`RegistryError::NotRegistered`] if the key is absent
    /// - [`RegistryError::Cycle`] if waiting would close a cycle
    /// - [`RegistryError::TypeMismatch`] if the stored value is not a `T`
    /// - any error returned by `init`
    pub async fn fetch<T, E, F, Fut>(
        &self,
        key: &RegistryKey,
        waiter: Option<&RegistryKey>,
        init: F,
    ) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        E: From<RegistryError>,
        F: FnOnce(Erased) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !key.is::<T>() {
            return Err(RegistryError::type_mismatch(key).into());
        }
        let entry = self
            .entry(key)
            .ok_or_else(|| RegistryError::not_registered(key))?;

        if let Some(value) = entry.cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Self::downcast(key, value.clone()).map_err(E::from);
        }

        let pending = entry.pending.lock().clone();
        let Some(pending) = pending else {
            // Payload is only taken after the cell is set
            return match entry.cell.get() {
                Some(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Self::downcast(key, value.clone()).map_err(E::from)
                }
                None => Err(RegistryError::not_registered(key).into()),
            };
        };

        let _guard = match waiter {
            Some(owner) => Some(WaitGuard::enter(&self.waits, owner, key).map_err(|chain| {
                RegistryError::Cycle {
                    chain: chain.iter().map(ToString::to_string).collect(),
                }
            })?),
            None => None,
        };

        let value = entry
            .cell
            .get_or_try_init(move || async move {
                self.initializations.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(entry = %key, "initializing deferred entry");
                let value = init(pending).await?;
                Ok::<Erased, E>(Arc::new(value))
            })
            .await?;
        entry.pending.lock().take();

        Self::downcast(key, value.clone()).map_err(E::from)
    }

    fn entry(&self, key: &RegistryKey) -> Option<Arc<Entry>> {
        // Clone the slot out so no map guard is held across an await
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    fn downcast<T>(key: &RegistryKey, value: Erased) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
    {
        value
            .downcast::<T>()
            .map_err(|_| RegistryError::type_mismatch(key))
    }

    /// Get number of registered keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// List all registered keys (unordered)
    #[must_use]
    pub fn keys(&self) -> Vec<RegistryKey> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Get registry statistics
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            entries: self.entries.len(),
            completed: self
                .entries
                .iter()
                .filter(|e| e.value().cell.initialized())
                .count(),
            hits: self.hits.load(Ordering::Relaxed),
            initializations: self.initializations.load(Ordering::Relaxed),
            waiting: self.waits.lock().waiting(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
