//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the data file's directory exists; warn when the file is absent.
pub async fn ensure_env(data_file: &std::path::Path) -> anyhow::Result<()> {
    common::env::ensure_data_dir(data_file).await
}
