use std::{
    collections::HashMap,
    ffi::OsString,
    hash::Hash,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use common::observability::{KV_PERSIST_DURATION, KV_PERSIST_FAILURES_TOTAL};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Whole-map JSON snapshot at a fixed path.
///
/// Every save rewrites the complete map: it is written to `<file>.tmp`,
/// fsynced, then renamed over the target so readers never see a torn file.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> Result<PathBuf, ServiceError> {
        let name = self.path.file_name().ok_or_else(|| {
            ServiceError::Persistence(format!("{} has no file name", self.path.display()))
        })?;
        let mut tmp = OsString::from(name);
        tmp.push(".tmp");
        Ok(self.path.with_file_name(tmp))
    }

    /// Read the snapshot. A missing file yields an empty map; a file that is
    /// not a JSON object of the expected types is `CorruptSnapshot`.
    pub async fn load<K, V>(&self) -> Result<HashMap<K, V>, ServiceError>
    where
        K: Eq + Hash + DeserializeOwned,
        V: DeserializeOwned,
    {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot on disk, starting empty");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(ServiceError::io("read", &self.path, e)),
        };

        serde_json::from_slice(&bytes).map_err(|e| ServiceError::CorruptSnapshot {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Replace the on-disk snapshot with `map`.
    pub async fn save<K, V>(&self, map: &HashMap<K, V>) -> Result<(), ServiceError>
    where
        K: Eq + Hash + Serialize,
        V: Serialize,
    {
        let timer = KV_PERSIST_DURATION.start_timer();
        let res = self.write_atomically(map).await;
        timer.observe_duration();
        if let Err(e) = &res {
            KV_PERSIST_FAILURES_TOTAL.inc();
            warn!(path = %self.path.display(), error = %e, "snapshot write failed");
        }
        res
    }

    async fn write_atomically<K, V>(&self, map: &HashMap<K, V>) -> Result<(), ServiceError>
    where
        K: Eq + Hash + Serialize,
        V: Serialize,
    {
        let mut data =
            serde_json::to_vec(map).map_err(|e| ServiceError::Serialization(e.to_string()))?;
        data.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::io("create dir", parent, e))?;
        }

        let tmp = self.tmp_path()?;
        let written = async {
            let mut file = fs::File::create(&tmp)
                .await
                .map_err(|e| ServiceError::io("create", &tmp, e))?;
            file.write_all(&data)
                .await
                .map_err(|e| ServiceError::io("write", &tmp, e))?;
            file.sync_all()
                .await
                .map_err(|e| ServiceError::io("sync", &tmp, e))?;
            fs::rename(&tmp, &self.path)
                .await
                .map_err(|e| ServiceError::io("rename onto", &self.path, e))
        }
        .await;

        if written.is_err() {
            let _ = fs::remove_file(&tmp).await;
        } else {
            debug!(path = %self.path.display(), bytes = data.len(), entries = map.len(), "snapshot written");
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, temp_data_file};

    #[tokio::test]
    async fn missing_file_loads_empty() -> Result<(), anyhow::Error> {
        let path = temp_data_file("snap_missing");
        let snap = SnapshotFile::new(&path);
        let map: HashMap<String, String> = snap.load().await?;
        assert!(map.is_empty());
        // loading must not create anything
        assert!(fs::metadata(&path).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn save_then_load_same_content() -> Result<(), anyhow::Error> {
        let path = temp_data_file("snap_rt");
        let snap = SnapshotFile::new(&path);
        let mut map = HashMap::new();
        map.insert("greeting".to_string(), "hello world".to_string());
        map.insert("empty".to_string(), String::new());
        snap.save(&map).await?;

        let loaded: HashMap<String, String> = snap.load().await?;
        assert_eq!(loaded, map);
        // the temp file never outlives a successful save
        assert!(fs::metadata(snap.tmp_path()?).await.is_err());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_fully_overwrites_previous_content() -> Result<(), anyhow::Error> {
        let path = temp_data_file("snap_overwrite");
        let snap = SnapshotFile::new(&path);
        let mut big = HashMap::new();
        for i in 0..50 {
            big.insert(format!("key-{i}"), "x".repeat(64));
        }
        snap.save(&big).await?;

        let mut small = HashMap::new();
        small.insert("only".to_string(), "one".to_string());
        snap.save(&small).await?;

        let raw = fs::read_to_string(&path).await?;
        assert_eq!(raw.trim_end(), r#"{"only":"one"}"#);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_corrupt_snapshot() -> Result<(), anyhow::Error> {
        let path = temp_data_file("snap_corrupt");
        fs::create_dir_all(path.parent().unwrap()).await?;
        for body in ["{\"a\": ", "[1, 2]", "{\"a\": 1}", ""] {
            fs::write(&path, body).await?;
            let res: Result<HashMap<String, String>, _> = SnapshotFile::new(&path).load().await;
            assert!(
                matches!(res, Err(ServiceError::CorruptSnapshot { .. })),
                "body {body:?} should be rejected"
            );
        }
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_path_is_persistence_error() -> Result<(), anyhow::Error> {
        let path = temp_data_file("snap_dir");
        // a directory where the file should be
        fs::create_dir_all(&path).await?;
        let res: Result<HashMap<String, String>, _> = SnapshotFile::new(&path).load().await;
        assert!(matches!(res, Err(ServiceError::Persistence(_))));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_rename_reports_error_and_removes_tmp() -> Result<(), anyhow::Error> {
        let path = temp_data_file("snap_fail");
        fs::create_dir_all(&path).await?;
        let snap = SnapshotFile::new(&path);
        let mut map = HashMap::new();
        map.insert("k".to_string(), "v".to_string());
        let res = snap.save(&map).await;
        assert!(matches!(res, Err(ServiceError::Persistence(_))));
        assert!(fs::metadata(snap.tmp_path()?).await.is_err());
        cleanup(&path).await;
        Ok(())
    }
}
