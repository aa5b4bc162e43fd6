//! Upstream call outcomes and error definitions.

use thiserror::Error;

/// Errors that can occur while talking to the aggregator.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The deadline elapsed before a response arrived.
    #[error("Upstream request timed out after {0} ms")]
    Timeout(u64),

    /// The aggregator answered with a non-success status.
    ///
    /// `message` is the upstream `error` field when present.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Connection, TLS or body transfer failure.
    #[error("Upstream request failed: {0}")]
    Network(String),

    /// The outbound URL could not be built.
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl UpstreamError {
    /// Terminal state of the call that produced this error.
    pub fn outcome(&self) -> CallOutcome {
        match self {
            UpstreamError::Timeout(_) => CallOutcome::TimedOut,
            _ => CallOutcome::CompletedError,
        }
    }
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Terminal state of a single outbound call.
///
/// A call starts pending and ends in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    TimedOut,
    CompletedOk,
    CompletedError,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::TimedOut => "timed_out",
            CallOutcome::CompletedOk => "ok",
            CallOutcome::CompletedError => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Timeout(12_000);
        assert_eq!(err.to_string(), "Upstream request timed out after 12000 ms");

        let err = UpstreamError::Status {
            status: 400,
            message: "Could not find any route".to_string(),
        };
        assert_eq!(err.to_string(), "Could not find any route");
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(UpstreamError::Timeout(1).outcome(), CallOutcome::TimedOut);
        assert_eq!(
            UpstreamError::Network("refused".into()).outcome(),
            CallOutcome::CompletedError
        );
        assert_eq!(CallOutcome::CompletedOk.as_str(), "ok");
    }
}
