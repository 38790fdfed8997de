//! Error types for the am-silences crate.

use thiserror::Error;

/// Errors that can occur while preparing or submitting silences.
#[derive(Debug, Error)]
pub enum SilenceError {
    /// The merged configuration is not usable.
    #[error("invalid configuration: {reason}")]
    ConfigValidation {
        /// The reason the configuration was rejected.
        reason: String,
    },

    /// No matcher expressions were given.
    #[error("no matchers specified")]
    NoMatchersSpecified,

    /// Every candidate matcher group already has an active silence.
    #[error("no new silences specified (enable verbose mode for more information)")]
    NoNewSilences,

    /// An absolute expiry timestamp could not be used.
    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp {
        /// The timestamp as given by the user.
        input: String,
        /// The reason it was rejected.
        reason: String,
    },

    /// A relative expiry duration could not be used.
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration {
        /// The duration as given by the user.
        input: String,
        /// The reason it was rejected.
        reason: String,
    },

    /// A matcher expression could not be parsed.
    #[error("invalid matcher '{input}': {reason}")]
    InvalidMatcher {
        /// The matcher expression as given by the user.
        input: String,
        /// The reason it was rejected.
        reason: String,
    },

    /// Fetching the current silences failed before a reply was received.
    #[error("failed to fetch silences from {url}: {reason}")]
    NetworkFailure {
        /// The request URL.
        url: String,
        /// The transport error.
        reason: String,
    },

    /// Submitting a silence failed before a reply was received.
    #[error("failed to submit silence to {url}: {reason}")]
    SubmissionFailed {
        /// The request URL.
        url: String,
        /// The transport or encoding error.
        reason: String,
    },

    /// The server replied with something other than the expected JSON document.
    #[error("unable to parse silence json response from {url}: {reason}")]
    MalformedResponse {
        /// The request URL.
        url: String,
        /// The decoding error.
        reason: String,
    },
}

impl SilenceError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            reason: reason.into(),
        }
    }
}

/// Result type for silence operations.
pub type Result<T> = std::result::Result<T, SilenceError>;
