//! Error types for cadenza-export

use std::io;
use thiserror::Error;

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    /// Error raised by a reader, writer or file plugin
    #[error(transparent)]
    Core(#[from] cadenza_core::Error),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported format or feature not enabled
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid export options
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(feature = "wav")]
impl From<hound::Error> for ExportError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => ExportError::Io(io),
            hound::Error::Unsupported => ExportError::UnsupportedFormat("wav".into()),
            other => ExportError::Io(io::Error::other(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err: ExportError = cadenza_core::Error::FileNotFound("a.wav".into()).into();
        assert_eq!(err.to_string(), "File not found or not supported: a.wav");
    }

    #[cfg(feature = "wav")]
    #[test]
    fn test_hound_error_conversion() {
        let err: ExportError = hound::Error::Unsupported.into();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)));

        let err: ExportError = hound::Error::FormatError("bad header").into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
