//! Error types for the heatmap toolkit.
//!
//! One hierarchy built with `thiserror`. Cache and storage errors are
//! produced by backends but recovered inside the cache; everything else
//! propagates to the caller.

use thiserror::Error;

/// Result type alias using `HeatmapError`.
pub type Result<T> = std::result::Result<T, HeatmapError>;

/// Main error type for all heatmap operations.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // ═══════════════════════════════════════════════════════════════════════════
    // FETCH ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Network-level failure (DNS, connection reset, body read).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status.
    #[error("Failed to fetch data: {status} {reason}")]
    FetchFailed {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase, empty if unknown
        reason: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // SHAPE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON payload is not a FeatureCollection of Features.
    #[error("JSON is not in GeoJSON FeatureCollection format: {0}")]
    InvalidFeatureCollection(String),

    /// Tabular payload could not be read.
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Key-value store read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Write would exceed the store's byte quota.
    #[error("Storage quota exceeded: {required} bytes needed, limit is {limit}")]
    QuotaExceeded {
        /// Configured quota in bytes
        limit: usize,
        /// Bytes the store would hold after the write
        required: usize,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Required environment variables are absent or empty.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvironment(Vec<String>),

    /// Configuration value is present but unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HeatmapError {
    /// Returns true if this error comes from the network and a later attempt
    /// might succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            HeatmapError::Http(_) => true,
            HeatmapError::FetchFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the payload was fetched but had the wrong shape.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            HeatmapError::InvalidFeatureCollection(_)
                | HeatmapError::Csv(_)
                | HeatmapError::Json(_)
        )
    }

    /// Returns true if this is a storage backend error.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            HeatmapError::Storage(_) | HeatmapError::QuotaExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeatmapError::FetchFailed {
            status: 404,
            reason: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch data: 404 Not Found");

        let err = HeatmapError::MissingEnvironment(vec!["MAPBOX_TOKEN".into()]);
        assert!(err.to_string().contains("MAPBOX_TOKEN"));
    }

    #[test]
    fn test_error_classification() {
        assert!(HeatmapError::Http("reset".into()).is_recoverable());
        assert!(HeatmapError::FetchFailed { status: 503, reason: "Unavailable".into() }.is_recoverable());
        assert!(!HeatmapError::FetchFailed { status: 404, reason: "Not Found".into() }.is_recoverable());

        assert!(HeatmapError::InvalidFeatureCollection("x".into()).is_validation_error());
        assert!(!HeatmapError::Http("x".into()).is_validation_error());

        assert!(HeatmapError::QuotaExceeded { limit: 10, required: 20 }.is_storage_error());
        assert!(!HeatmapError::Config("x".into()).is_storage_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(HeatmapError::from);
        assert!(matches!(result, Err(HeatmapError::Json(_))));
    }
}
