//! Error types and handling for geobatch.

/// Result type alias for geocoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for geocoding operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or HTTP failure on a single fetch
    #[error("Network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// Response JSON does not match the expected shape at the top level
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Error message
        message: String,
    },

    /// One result entry within a response is missing an expected field
    #[error("Malformed record: {message}")]
    MalformedRecord {
        /// Error message
        message: String,
    },

    /// CSV read/write errors
    #[error("CSV error: {source}")]
    Csv {
        /// Source error
        #[from]
        source: csv::Error,
    },

    /// I/O errors
    #[error("I/O error: {source}")]
    Io {
        /// Source error
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new malformed-record error
    pub fn malformed_record(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }
}
