#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("No active user session")]
    NoSession,
}

/// Failures of the local key/value store. The synchronizer logs and swallows them.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Local storage unavailable: {0}")]
    Unavailable(String),

    #[error("Local storage quota exceeded: {needed} bytes needed, {limit} bytes allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("Local storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
