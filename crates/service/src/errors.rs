use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid credentials")]
    Unauthorized,
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("corrupt snapshot at {}: {reason}", .path.display())]
    CorruptSnapshot { path: PathBuf, reason: String },
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ServiceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 1004,
            ServiceError::Persistence(_) => 1200,
            ServiceError::CorruptSnapshot { .. } => 1201,
            ServiceError::Serialization(_) => 1202,
        }
    }

    pub fn io(action: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Persistence(format!("{action} {}: {err}", path.display()))
    }
}
