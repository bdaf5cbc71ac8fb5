//! Error types for the evidence pipeline.
//!
//! Uses `thiserror` with structured variants covering upstream services,
//! the record store, and local validation. Only `NotFound` and an
//! unrecovered `Upstream` error are meant to reach callers as hard
//! failures; parse and persistence problems degrade in place.

/// Top-level error type for the Open ME/CFS core library.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from external service calls (reasoning, embedding, source fetch).
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {message}")]
    Request { service: &'static str, message: String },

    #[error("{service} returned status {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} timed out after {timeout_secs}s")]
    Timeout {
        service: &'static str,
        timeout_secs: u64,
    },

    #[error("{service} response could not be parsed: {message}")]
    MalformedResponse { service: &'static str, message: String },

    #[error("authentication failed for {service}: {message}")]
    Auth { service: &'static str, message: String },
}

/// Errors from the record store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {key}")]
    NotFound { key: String },

    #[error("write rejected: {message}")]
    WriteRejected { message: String },

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

/// A type alias for results using the top-level `PlatformError`.
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = PlatformError::NotFound {
            entity: "paper",
            id: "40627437".into(),
        };
        assert_eq!(err.to_string(), "paper not found: 40627437");
    }

    #[test]
    fn test_upstream_display() {
        let err = PlatformError::Upstream(UpstreamError::Timeout {
            service: "reasoning",
            timeout_secs: 60,
        });
        assert_eq!(
            err.to_string(),
            "upstream error: reasoning timed out after 60s"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::WriteRejected {
            message: "disk full".into(),
        };
        let err: PlatformError = store_err.into();
        assert!(matches!(err, PlatformError::Store(_)));
    }

    #[test]
    fn test_malformed_response_display() {
        let err = UpstreamError::MalformedResponse {
            service: "embedding",
            message: "missing data array".into(),
        };
        assert_eq!(
            err.to_string(),
            "embedding response could not be parsed: missing data array"
        );
    }
}
