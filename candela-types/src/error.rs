use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the candela workspace.
///
/// Malformed individual records are never surfaced here: they are dropped during
/// reconciliation and reported as [`crate::SkippedRecord`]s instead. This type
/// covers whole-batch rejection, argument validation, and source failures.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CandelaError {
    /// The incoming payload is not a sequence of record-shaped values.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A candle source failed to deliver a batch.
    #[error("{provider} failed: {msg}")]
    Source {
        /// Source name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The source answered with a non-success HTTP status.
    #[error("{provider} answered with HTTP {status}")]
    Http {
        /// Source name that answered.
        provider: String,
        /// HTTP status code.
        status: u16,
    },

    /// A symbol or resource could not be found upstream.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "candles for EURUSD-OTC M5".
        what: String,
    },

    /// A single source call exceeded the configured timeout.
    #[error("source timed out: {provider}")]
    SourceTimeout {
        /// Source name that timed out.
        provider: String,
    },

    /// The feed already owns a live poll task.
    #[error("feed is already running")]
    AlreadyRunning,

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl CandelaError {
    /// Helper: build a `Source` error with the source name and message.
    pub fn source(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `InvalidBatch` error.
    pub fn invalid_batch(msg: impl Into<String>) -> Self {
        Self::InvalidBatch(msg.into())
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `SourceTimeout` error.
    pub fn source_timeout(provider: impl Into<String>) -> Self {
        Self::SourceTimeout {
            provider: provider.into(),
        }
    }

    /// Returns true if retrying the same request later may succeed.
    ///
    /// Transport-level failures and 5xx/429 answers are transient; bad payloads,
    /// bad arguments and not-found conditions are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Source { .. } | Self::SourceTimeout { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
