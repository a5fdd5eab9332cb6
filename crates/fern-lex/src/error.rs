//! Error types for the lexer crate.

use thiserror::Error;

/// Error type for tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexError {
    /// A single token spans more than two input buffers in streaming mode.
    #[error("token too long: token spans more than two input buffers")]
    TokenTooLong,
}

/// Result type alias for lexer operations.
pub type Result<T> = std::result::Result<T, LexError>;
