//! Error reporting at the driver boundary
//!
//! Core components return discriminated results and never decide on
//! presentation. The driver reports failures through
//! [`log_error_with_context`], which picks the level of detail based on
//! whether the error is something the user can act on.

/// Errors that can tell user-actionable failures apart from system failures
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the error carries a message the user can act on directly
    /// (bad configuration, unknown record id, invalid input line).
    fn is_user_actionable(&self) -> bool;

    /// The user-facing message for actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log an error with the appropriate level of detail
///
/// User-actionable errors log their own message; system errors (IO,
/// network) log the operation context and keep the raw detail at debug
/// level.
///
/// # Examples
/// ```rust,no_run
/// use scanlog::core::error_handling::log_error_with_context;
/// use scanlog::store::StoreError;
///
/// let err = StoreError::Corrupt {
///     message: "unexpected end of file".to_string(),
/// };
/// log_error_with_context(&err, "Loading scan store");
/// // Logs: "Loading scan store failed" (+ detail at debug level)
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("{}: {}", operation_context, user_msg);
        }
        _ => {
            log::error!("{} failed", operation_context);
        }
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<&str> {
            Some(&self.message)
        }
    }

    #[derive(Debug)]
    struct TestSystemError;

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk unavailable")
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_user_actionable_error_exposes_message() {
        let error = TestUserError {
            message: "No scan with id 7".to_string(),
        };

        assert!(error.is_user_actionable());
        assert_eq!(error.user_message(), Some("No scan with id 7"));
        log_error_with_context(&error, "Deleting scan");
    }

    #[test]
    fn test_system_error_hides_detail() {
        let error = TestSystemError;

        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
        log_error_with_context(&error, "Saving scan");
    }
}
