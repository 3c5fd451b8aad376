//! Sync Error Types

#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("Failed to build HTTP client: {message}")]
    Client { message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl crate::core::error_handling::ContextualError for NetworkError {
    fn is_user_actionable(&self) -> bool {
        // A misconfigured client (bad base URL, TLS setup) is fixable in config
        matches!(self, NetworkError::Client { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            NetworkError::Client { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type for a single transport send
pub type SyncTransportResult<T> = Result<T, NetworkError>;
