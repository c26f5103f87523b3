#![cfg(test)]
use std::path::PathBuf;

/// Unique, not-yet-existing snapshot path under the system temp dir.
pub fn temp_data_file(prefix: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("{prefix}_{}", uuid::Uuid::new_v4()))
        .join("kv.json")
}

/// Best-effort removal of the directory created around `temp_data_file`.
pub async fn cleanup(path: &std::path::Path) {
    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
