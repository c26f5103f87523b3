use std::{collections::HashMap, hash::Hash, path::{Path, PathBuf}, sync::Arc};
use tokio::sync::RwLock;

use super::snapshot::SnapshotFile;
use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Holds a `HashMap<K, V>` behind a reader/writer lock and rewrites the whole
/// map to its snapshot file on every mutation. Mutations keep the write lock
/// until the snapshot is on disk, so writers (including their file writes)
/// are fully serialized and readers never see a half-applied change.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    snapshot: SnapshotFile,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Open the store at `path`, loading any existing snapshot.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is an error.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let snapshot = SnapshotFile::new(path);
        let map = snapshot.load::<K, V>().await?;
        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), snapshot }))
    }

    pub fn snapshot_path(&self) -> &Path {
        self.snapshot.path()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// All keys, in no particular order.
    pub async fn keys(&self) -> Vec<K> {
        let map = self.inner.read().await;
        map.keys().cloned().collect()
    }

    /// List all entries as `(key, value)` pairs.
    #[cfg(test)]
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Insert or update a value by key and persist.
    ///
    /// On a persist failure the in-memory insert is kept and the error returned.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.snapshot.save(&*map).await
    }
}
