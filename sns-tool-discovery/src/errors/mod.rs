//! Error handling module

use std::path::PathBuf;
use thiserror::Error;

use crate::aws::AwsError;

/// Result type alias for operations that can fail with `AuditError`
pub type Result<T> = std::result::Result<T, AuditError>;

/// Error type for the cross-account subscription audit.
///
/// Fatal and recoverable listing failures are kept as separate variants so
/// callers can decide between aborting the pass and skipping a single topic.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Credentials, region or other inputs could not be loaded or are invalid
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message about the configuration issue
        message: String,
        /// Optional underlying error that caused the configuration failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The identity service could not tell us who the credentials belong to
    #[error("Unable to get caller identity: {source}")]
    IdentityLookup {
        /// The underlying provider error
        #[source]
        source: AwsError,
    },

    /// Active credentials belong to a different account than the one requested
    #[error("current credentials are for account {actual}, but requested account is {expected}")]
    IdentityMismatch {
        /// Account the caller asked to audit
        expected: String,
        /// Account the credentials are bound to
        actual: String,
    },

    /// Topic enumeration failed; the discovery pass cannot continue
    #[error("Unable to list topics: {source}")]
    TopicListing {
        /// The underlying provider error
        #[source]
        source: AwsError,
    },

    /// Subscription enumeration failed for one topic; that topic is skipped
    #[error("unable to list subscriptions for topic {topic_arn}: {source}")]
    SubscriptionListing {
        /// Topic whose subscriptions could not be listed
        topic_arn: String,
        /// The underlying provider error
        #[source]
        source: AwsError,
    },

    /// File system operation errors while writing a report
    #[error("Output error during {operation} on path '{path}': {source}")]
    Output {
        /// The operation that failed (e.g., "create", "flush")
        operation: String,
        /// The file path involved in the operation
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding errors while writing a report
    #[error("Failed to write CSV to '{path}': {source}")]
    CsvOutput {
        /// Destination of the CSV report
        path: PathBuf,
        /// The underlying CSV error
        #[source]
        source: csv::Error,
    },
}

impl AuditError {
    /// Create a configuration error
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub(crate) fn configuration_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an output error with operation context
    pub(crate) fn output(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Output {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a CSV output error
    pub(crate) fn csv_output(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::CsvOutput {
            path: path.into(),
            source,
        }
    }

    /// Whether the audit can carry on after this error.
    ///
    /// Only a per-topic subscription listing failure is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::SubscriptionListing { .. })
    }
}
