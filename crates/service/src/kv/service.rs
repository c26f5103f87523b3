use std::sync::Arc;

use common::observability::{KV_ENTRIES, KV_GETS_TOTAL, KV_GET_MISSES_TOTAL, KV_SETS_TOTAL, KV_UNAUTHORIZED_TOTAL};
use tracing::{debug, error, info, instrument, warn};

use super::store::KvStore;
use crate::access::AccessController;
use crate::errors::ServiceError;

/// Key-value operations as seen by a transport, independent of web framework.
///
/// Mutations are authorized first, then applied and persisted by the store.
/// Reads go straight to the store.
#[derive(Clone)]
pub struct KvService {
    store: Arc<dyn KvStore>,
    access: AccessController,
}

impl KvService {
    pub fn new(store: Arc<dyn KvStore>, access: AccessController) -> Self {
        Self { store, access }
    }

    /// Set `key` to `value` if `credential` is the admin credential.
    ///
    /// A wrong credential changes nothing. A persistence failure is returned
    /// even though the value is already visible to readers.
    ///
    /// # Examples
    /// ```
    /// use service::{access::AccessController, kv::{service::KvService, store::mock::MemoryKvStore}};
    /// use std::sync::Arc;
    /// let svc = KvService::new(Arc::new(MemoryKvStore::default()), AccessController::new("pw"));
    /// tokio_test::block_on(svc.set("k".into(), "v".into(), "pw")).unwrap();
    /// assert_eq!(tokio_test::block_on(svc.get("k")).as_deref(), Some("v"));
    /// assert!(tokio_test::block_on(svc.set("k".into(), "x".into(), "nope")).is_err());
    /// ```
    #[instrument(skip_all, fields(key = %key))]
    pub async fn set(&self, key: String, value: String, credential: &str) -> Result<(), ServiceError> {
        if !self.access.authorize(credential) {
            KV_UNAUTHORIZED_TOTAL.inc();
            warn!("kv_set_unauthorized");
            return Err(ServiceError::Unauthorized);
        }

        let value_len = value.len();
        match self.store.set(key, value).await {
            Ok(()) => {
                KV_SETS_TOTAL.inc();
                KV_ENTRIES.set(self.store.entry_count().await as i64);
                info!(value_len, "kv_set");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, code = e.code(), "kv_set_persist_failed");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Option<String> {
        KV_GETS_TOTAL.inc();
        let value = self.store.get(key).await;
        if value.is_none() {
            KV_GET_MISSES_TOTAL.inc();
            debug!("kv_get_miss");
        }
        value
    }

    /// Every known key, in no particular order.
    pub async fn list_keys(&self) -> Vec<String> {
        self.store.list_keys().await
    }

    /// `true` only when `candidate` is exactly the admin credential.
    pub fn check_credential(&self, candidate: &str) -> bool {
        self.access.authorize(candidate)
    }

    pub async fn entry_count(&self) -> usize {
        self.store.entry_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::kv_file_store::FileKvStore;
    use crate::kv::store::mock::MemoryKvStore;
    use crate::storage::snapshot::SnapshotFile;
    use crate::test_support::{cleanup, temp_data_file};
    use std::collections::{HashMap, HashSet};

    const PW: &str = "correct horse";

    async fn file_service(prefix: &str) -> Result<(KvService, std::path::PathBuf), ServiceError> {
        let path = temp_data_file(prefix);
        let store = FileKvStore::open(&path).await?;
        Ok((KvService::new(store, AccessController::new(PW)), path))
    }

    #[tokio::test]
    async fn get_after_set_returns_value() -> Result<(), anyhow::Error> {
        let (svc, path) = file_service("kvsvc_get").await?;
        svc.set("k".into(), "v".into(), PW).await?;
        assert_eq!(svc.get("k").await.as_deref(), Some("v"));
        assert_eq!(svc.get("never-set").await, None);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn list_contains_exactly_the_set_keys() -> Result<(), anyhow::Error> {
        let (svc, path) = file_service("kvsvc_list").await?;
        svc.set("a".into(), "1".into(), PW).await?;
        svc.set("b".into(), "2".into(), PW).await?;
        let keys: HashSet<String> = svc.list_keys().await.into_iter().collect();
        assert_eq!(keys, HashSet::from(["a".to_string(), "b".to_string()]));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn wrong_credential_changes_neither_memory_nor_file() -> Result<(), anyhow::Error> {
        let (svc, path) = file_service("kvsvc_unauth").await?;
        svc.set("k".into(), "original".into(), PW).await?;
        let before = tokio::fs::read(&path).await?;

        for bad in ["", "Correct Horse", "correct horse ", "admin"] {
            let res = svc.set("k".into(), "hijacked".into(), bad).await;
            assert!(matches!(res, Err(ServiceError::Unauthorized)));
            let res = svc.set("new".into(), "x".into(), bad).await;
            assert!(matches!(res, Err(ServiceError::Unauthorized)));
        }

        assert_eq!(svc.get("k").await.as_deref(), Some("original"));
        assert_eq!(svc.get("new").await, None);
        assert_eq!(tokio::fs::read(&path).await?, before);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_set_on_fresh_store_writes_no_file() -> Result<(), anyhow::Error> {
        let (svc, path) = file_service("kvsvc_unauth_fresh").await?;
        assert!(svc.set("k".into(), "v".into(), "guess").await.is_err());
        assert!(tokio::fs::metadata(&path).await.is_err());
        assert_eq!(svc.entry_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn value_survives_restart() -> Result<(), anyhow::Error> {
        let (svc, path) = file_service("kvsvc_restart").await?;
        svc.set("persisted".into(), "yes".into(), PW).await?;
        drop(svc);

        let reopened = KvService::new(FileKvStore::open(&path).await?, AccessController::new(PW));
        assert_eq!(reopened.get("persisted").await.as_deref(), Some("yes"));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn persistence_failure_is_reported_without_rollback() {
        let store = Arc::new(MemoryKvStore::default());
        store.fail_writes(true);
        let svc = KvService::new(store.clone(), AccessController::new(PW));

        let res = svc.set("k".into(), "v".into(), PW).await;
        assert!(matches!(res, Err(ServiceError::Persistence(_))));
        assert_eq!(svc.get("k").await.as_deref(), Some("v"));

        store.fail_writes(false);
        assert!(svc.set("k".into(), "w".into(), PW).await.is_ok());
    }

    #[test]
    fn check_credential_reports_real_match() {
        let svc = KvService::new(Arc::new(MemoryKvStore::default()), AccessController::new(PW));
        assert!(svc.check_credential(PW));
        assert!(!svc.check_credential("CORRECT HORSE"));
        assert!(!svc.check_credential(""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sets_leave_file_equal_to_memory() -> Result<(), anyhow::Error> {
        let (svc, path) = file_service("kvsvc_stress").await?;
        let mut handles = Vec::new();
        for worker in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    svc.set(format!("hot-{}", i % 3), format!("{worker}:{i}"), PW).await?;
                    svc.set(format!("cold-{worker}-{i}"), i.to_string(), PW).await?;
                    // readers interleave with writers
                    let _ = svc.list_keys().await;
                }
                Ok::<_, ServiceError>(())
            }));
        }
        for h in handles {
            h.await??;
        }

        let mut in_memory = HashMap::new();
        for k in svc.list_keys().await {
            let v = svc.get(&k).await.expect("listed key has a value");
            in_memory.insert(k, v);
        }
        let on_disk: HashMap<String, String> = SnapshotFile::new(&path).load().await?;
        assert_eq!(in_memory.len(), 8 * 25 + 3);
        assert_eq!(in_memory, on_disk);
        cleanup(&path).await;
        Ok(())
    }
}
