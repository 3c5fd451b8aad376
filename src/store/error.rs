//! Store Error Types

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage IO failed during {operation} ({path}): {source}")]
    Io {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan store data is corrupt: {message}")]
    Corrupt { message: String },

    #[error("Internal synchronisation error: {message}")]
    Lock { message: String },
}

impl StoreError {
    pub(crate) fn io(operation: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            operation: operation.to_string(),
            path: path.display().to_string(),
            source,
        }
    }
}

impl crate::core::error_handling::ContextualError for StoreError {
    fn is_user_actionable(&self) -> bool {
        // A corrupt store file is something the user has to repair or move away
        matches!(self, StoreError::Corrupt { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StoreError::Corrupt { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
