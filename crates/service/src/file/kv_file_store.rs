use std::sync::Arc;
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;
use crate::kv::store::KvStore;

/// File-backed key-value store.
/// Keeps a map of `key -> value` persisted as one JSON object.
#[derive(Clone)]
pub struct FileKvStore {
    store: Arc<JsonMapStore<String, String>>,
}

impl FileKvStore {
    /// Open the store from the given file path. A missing file means an empty store.
    pub async fn open<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, String>::open(path).await?;
        Ok(Arc::new(Self { store }))
    }

    pub fn data_file(&self) -> &std::path::Path {
        self.store.snapshot_path()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.store.get(&key.to_string()).await
    }

    /// Upsert the value for a key and persist.
    pub async fn set(&self, key: String, value: String) -> Result<(), ServiceError> {
        self.store.insert(key, value).await
    }

    pub async fn list_keys(&self) -> Vec<String> {
        self.store.keys().await
    }

    pub async fn entry_count(&self) -> usize {
        self.store.len().await
    }
}

#[async_trait::async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Option<String> { self.get(key).await }
    async fn set(&self, key: String, value: String) -> Result<(), ServiceError> { self.set(key, value).await }
    async fn list_keys(&self) -> Vec<String> { self.list_keys().await }
    async fn entry_count(&self) -> usize { self.entry_count().await }
}
