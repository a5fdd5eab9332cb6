//! fern-lex — Tokenizer for Fern source text.
//!
//! The lexer turns a byte stream into the token alphabet of the
//! language: `(`, `)`, `'`, symbols, strings, ints, and floats, with
//! whitespace and `;`-to-newline comments skipped in between.
//!
//! Two input modes are supported:
//!
//! - **In-memory**: the program text is borrowed for the lexer's
//!   lifetime and scanned in place.
//! - **Streaming**: input is pulled through any [`std::io::Read`] into
//!   two fixed-size buffers, so files larger than memory can be lexed.
//!   A single token may span at most two buffers; longer tokens report
//!   [`LexError::TokenTooLong`].
//!
//! Tokens never own their text. Callers materialize the current token's
//! bytes with [`Lexer::copy_token`], which performs at most two copies
//! even when the token is split across the streaming buffers. This
//! keeps tokenization free of per-token allocation.

mod error;
mod lexer;
mod source;
mod token;

pub use error::{LexError, Result};
pub use lexer::Lexer;
pub use source::DEFAULT_BUFFER_SIZE;
pub use token::TokenKind;
