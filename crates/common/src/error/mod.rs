//! Error classification shared by every layer.
//!
//! Module-specific error enums stay where they are raised (store, OAuth
//! client, domain). This module only supplies the vocabulary used to reason
//! about them uniformly: whether a failure is transient, how loud it should
//! be in the logs, and whether it signals a broken invariant.
//!
//! Nothing in the workspace retries automatically. `is_retryable` is advisory
//! and exists so an outer transport layer can decide for itself.

use std::fmt;
use std::time::Duration;

/// Standard interface for classifying errors by their characteristics.
pub trait ErrorClassification {
    /// Whether the same call could succeed if attempted again later.
    ///
    /// Store outages, timeouts and upstream rate limits are transient.
    /// A consumed authorization state never is.
    fn is_retryable(&self) -> bool;

    /// Severity used to pick the log level.
    fn severity(&self) -> ErrorSeverity;

    /// Whether the error indicates a violated invariant or corrupted data.
    fn is_critical(&self) -> bool;

    /// Suggested delay before a retry, when the upstream provided one.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl ErrorSeverity {
    /// Stable lowercase label for structured log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
