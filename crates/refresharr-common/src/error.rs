//! Common error types used throughout refresharr.
//!
//! The variants follow how a failure is handled by the hunt loop: remote and
//! malformed-response failures skip the current item or page, configuration
//! failures skip the cycle, and storage failures degrade to an empty store
//! (reads) or a retry on the next cycle (writes).

/// Common error type for refresharr.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A network failure, timeout, or non-2xx response from an *arr API.
    #[error("Remote error: {0}")]
    Remote(String),

    /// The *arr API answered, but without the fields we need.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The configuration holds a value that cannot be acted on.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A processed-ID store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new Remote error.
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a new MalformedResponse error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a new Configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new Storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether the failure only affects the current item, page, or phase.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::MalformedResponse(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::remote("connection refused");
        assert_eq!(err.to_string(), "Remote error: connection refused");

        let err = Error::malformed("missing command id");
        assert_eq!(err.to_string(), "Malformed response: missing command id");

        let err = Error::configuration("unknown hunt mode 'all'");
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown hunt mode 'all'"
        );

        let err = Error::storage("read-only file system");
        assert_eq!(err.to_string(), "Storage error: read-only file system");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::remote("timeout").is_transient());
        assert!(Error::malformed("no totalRecords").is_transient());
        assert!(!Error::configuration("bad mode").is_transient());
        assert!(!Error::storage("disk full").is_transient());
    }
}
