//! Error types for cadenza-core.

use thiserror::Error;

/// Error type for cadenza-core operations.
///
/// Steady-state `read()`/`write()` calls signal exhaustion through
/// [`ReadStatus`](crate::ReadStatus), never through this type.
#[derive(Error, Debug)]
pub enum Error {
    /// No registered file plugin could handle the input or output.
    #[error("File not found or not supported: {0}")]
    FileNotFound(String),

    /// Opening, decoding, encoding or writing a file failed.
    #[error("File error: {0}")]
    File(String),

    /// Invalid construction parameters for a reader, writer or effect.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid specs: {0}")]
    InvalidSpecs(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn file(msg: impl Into<String>) -> Self {
        Self::File(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FileNotFound("song.ogg".to_string());
        assert_eq!(err.to_string(), "File not found or not supported: song.ogg");

        let err = Error::invalid_state("time ratio out of range");
        assert_eq!(err.to_string(), "Invalid state: time ratio out of range");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
