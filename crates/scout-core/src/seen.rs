// SPDX-License-Identifier: Apache-2.0

//! Seen-issue deduplication.
//!
//! [`SeenSetDeduper`] keeps every issue key emitted so far in memory, seeded
//! from a [`SeenStore`] at startup. Marking a key is immediate; persisting it
//! happens in the background and never rolls the mark back. Keys marked
//! while a write is in flight are coalesced into the next write.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::error::ScoutError;
use crate::storage::{read_json, write_json_atomic};

/// Identity of an issue across runs: repository and issue number.
///
/// `repo` is `owner/name`. Stores written before owners were tracked hold a
/// bare `name`; such a key matches every owner's repository of that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeenKey {
    /// Repository as `owner/name`, or a bare name for legacy keys.
    pub repo: String,
    /// Issue number.
    pub number: u64,
}

impl SeenKey {
    /// Creates a key from a repository string as stored.
    #[must_use]
    pub fn new(repo: &str, number: u64) -> Self {
        Self {
            repo: repo.to_string(),
            number,
        }
    }

    /// Key of issue `number` in `owner/name`.
    #[must_use]
    pub fn for_repo(owner: &str, name: &str, number: u64) -> Self {
        Self {
            repo: format!("{owner}/{name}"),
            number,
        }
    }

    /// True if the key carries no owner.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        !self.repo.contains('/')
    }

    /// The bare-name form of an owner-qualified key.
    #[must_use]
    pub fn legacy(&self) -> Option<Self> {
        let (_, name) = self.repo.split_once('/')?;
        Some(Self::new(name, self.number))
    }

    /// Parses the `owner/name/number` display form, or the legacy
    /// `name/number` form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (repo, number) = s.rsplit_once('/')?;
        if repo.split('/').any(str::is_empty) || repo.matches('/').count() > 1 {
            return None;
        }
        Some(Self::new(repo, number.parse().ok()?))
    }
}

impl fmt::Display for SeenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.repo, self.number)
    }
}

/// Durable storage for seen keys.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Loads every stored key.
    async fn load_all_keys(&self) -> Result<Vec<SeenKey>, ScoutError>;

    /// Stores `keys`. Storing an existing key is a no-op.
    async fn upsert_keys(&self, keys: &[SeenKey]) -> Result<(), ScoutError>;
}

/// [`SeenStore`] backed by a JSON array of key strings.
#[derive(Debug)]
pub struct JsonSeenStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonSeenStore {
    /// File name inside the data directory.
    pub const FILE_NAME: &'static str = "seen.json";

    /// Store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store at `seen.json` inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(Self::FILE_NAME))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SeenStore for JsonSeenStore {
    async fn load_all_keys(&self) -> Result<Vec<SeenKey>, ScoutError> {
        let _guard = self.lock.lock().await;
        let raw: Vec<String> = read_json(&self.path).await?;
        let keys: Vec<SeenKey> = raw.iter().filter_map(|k| SeenKey::parse(k)).collect();
        if keys.len() != raw.len() {
            warn!(
                skipped = raw.len() - keys.len(),
                "Ignoring malformed seen keys"
            );
        }
        Ok(keys)
    }

    async fn upsert_keys(&self, keys: &[SeenKey]) -> Result<(), ScoutError> {
        let _guard = self.lock.lock().await;
        let mut stored: BTreeSet<String> = read_json(&self.path).await?;
        let before = stored.len();
        stored.extend(keys.iter().map(ToString::to_string));
        if stored.len() != before {
            write_json_atomic(&self.path, &stored).await?;
        }
        Ok(())
    }
}

/// Keys waiting to be written, and whether a writer is draining them.
#[derive(Debug, Default)]
struct Pending {
    keys: Vec<SeenKey>,
    writing: bool,
}

/// In-memory seen set with background persistence.
pub struct SeenSetDeduper {
    keys: RwLock<HashSet<SeenKey>>,
    store: Option<Arc<dyn SeenStore>>,
    pending: Arc<Mutex<Pending>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for SeenSetDeduper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeenSetDeduper")
            .field("len", &self.len())
            .field("persistent", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for SeenSetDeduper {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenSetDeduper {
    /// An empty, memory-only set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keys(Vec::new(), None)
    }

    fn with_keys(keys: Vec<SeenKey>, store: Option<Arc<dyn SeenStore>>) -> Self {
        Self {
            keys: RwLock::new(keys.into_iter().collect()),
            store,
            pending: Arc::new(Mutex::new(Pending::default())),
            writer: Mutex::new(None),
        }
    }

    /// A set seeded from `store`, persisting new keys back to it.
    ///
    /// A store that cannot be read is logged and treated as empty.
    #[instrument(skip(store))]
    pub async fn load(store: Arc<dyn SeenStore>) -> Self {
        let keys = match store.load_all_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to load seen keys, starting empty");
                Vec::new()
            }
        };
        debug!(count = keys.len(), "Loaded seen keys");
        Self::with_keys(keys, Some(store))
    }

    /// True if `key`, or its legacy bare-name form, has been marked.
    #[must_use]
    pub fn contains(&self, key: &SeenKey) -> bool {
        let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
        keys.contains(key) || key.legacy().is_some_and(|legacy| keys.contains(&legacy))
    }

    /// Marks `key` as seen.
    ///
    /// Returns `true` if neither the key nor its legacy form was already
    /// present. Only the caller that gets `true` may emit the issue. New keys
    /// are persisted in the background when a store is attached.
    pub fn mark_seen(&self, key: SeenKey) -> bool {
        let inserted = {
            let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
            let legacy_seen = key.legacy().is_some_and(|legacy| keys.contains(&legacy));
            !legacy_seen && keys.insert(key.clone())
        };

        if inserted {
            self.persist(key);
        }
        inserted
    }

    fn pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, key: SeenKey) {
        let Some(store) = self.store.clone() else {
            return;
        };

        // Without a runtime the key stays queued until `flush`.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.pending().keys.push(key);
            return;
        };
        let start_writer = {
            let mut pending = self.pending();
            pending.keys.push(key);
            !std::mem::replace(&mut pending.writing, true)
        };
        if !start_writer {
            return;
        }

        let pending = Arc::clone(&self.pending);
        let task = runtime.spawn(async move { drain(store.as_ref(), &pending).await });
        *self.writer.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
    }

    /// Waits until every key marked so far has been handed to the store.
    pub async fn flush(&self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        loop {
            let task = self.writer.lock().unwrap_or_else(PoisonError::into_inner).take();
            let Some(task) = task else { break };
            if let Err(e) = task.await {
                warn!(error = %e, "Seen key writer failed");
                self.pending().writing = false;
            }
        }
        drain(store.as_ref(), &self.pending).await;
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no key has been marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes queued keys in batches until the queue is empty.
async fn drain(store: &dyn SeenStore, pending: &Mutex<Pending>) {
    loop {
        let batch = {
            let mut pending = pending.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.keys.is_empty() {
                pending.writing = false;
                return;
            }
            pending.writing = true;
            std::mem::take(&mut pending.keys)
        };
        debug!(count = batch.len(), "Persisting seen keys");
        if let Err(e) = store.upsert_keys(&batch).await {
            warn!(count = batch.len(), error = %e, "Failed to persist seen keys");
        }
    }
}
