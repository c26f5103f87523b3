use async_trait::async_trait;

use crate::errors::ServiceError;

/// Trait abstraction for the key-value store.
/// Reads may run concurrently; `set` is exclusive against every other call
/// and returns only once the change is durable (or has failed to be).
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: String, value: String) -> Result<(), ServiceError>;
    async fn list_keys(&self) -> Vec<String>;
    async fn entry_count(&self) -> usize;
}

/// Simple in-memory store for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryKvStore {
        map: RwLock<HashMap<String, String>>,
        fail_writes: AtomicBool,
    }

    impl MemoryKvStore {
        /// Make every following `set` apply in memory and then report a persistence failure.
        pub fn fail_writes(&self, on: bool) {
            self.fail_writes.store(on, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl KvStore for MemoryKvStore {
        async fn get(&self, key: &str) -> Option<String> {
            self.map.read().await.get(key).cloned()
        }

        async fn set(&self, key: String, value: String) -> Result<(), ServiceError> {
            self.map.write().await.insert(key, value);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Persistence("simulated write failure".into()));
            }
            Ok(())
        }

        async fn list_keys(&self) -> Vec<String> {
            self.map.read().await.keys().cloned().collect()
        }

        async fn entry_count(&self) -> usize {
            self.map.read().await.len()
        }
    }
}
