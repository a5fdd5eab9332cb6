//! Error handling for the fernt CLI.

use thiserror::Error;

/// Main error type for the fernt CLI application.
#[derive(Error, Debug)]
pub enum FerntError {
    /// A configuration file could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The interpreter reported an error.
    #[error("{0}")]
    Interpreter(#[from] fern::Error),

    /// An IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using FerntError.
pub type Result<T> = std::result::Result<T, FerntError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = FerntError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_interpreter_error_conversion() {
        let err: FerntError = fern::Error::UnknownVar.into();
        assert_eq!(err.to_string(), "eval error: unknown variable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FerntError = io_err.into();
        assert!(matches!(err, FerntError::Io(_)));
    }
}
