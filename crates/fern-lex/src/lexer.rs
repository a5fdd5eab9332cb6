//! The tokenizer.
//!
//! Tokenization is speculative: after whitespace and comments are
//! skipped, the scanner tries `string`, then `float`, then `int`, then
//! `symbol`, resetting the scan cursor to the token start whenever a
//! match fails. The ordering matters: `1.5` must become a float before
//! the int matcher can claim the `1`, and `"..."` must be claimed
//! before the symbol matcher sees the opening quote.

use std::io::Read;

use crate::error::Result;
use crate::source::{Source, DEFAULT_BUFFER_SIZE};
use crate::token::TokenKind;

/// Streaming tokenizer over in-memory text or a reader.
pub struct Lexer<'a> {
    source: Source<'a>,
    token: TokenKind,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over in-memory program text.
    pub fn new(text: &'a str) -> Self {
        Self {
            source: Source::from_text(text),
            token: TokenKind::None,
        }
    }

    /// Create a lexer streaming from a reader with the default buffer
    /// size.
    pub fn from_reader<R: Read + 'a>(reader: R) -> Self {
        Self::from_reader_with_buffer(reader, DEFAULT_BUFFER_SIZE)
    }

    /// Create a lexer streaming from a reader with the given per-buffer
    /// size in bytes.
    pub fn from_reader_with_buffer<R: Read + 'a>(reader: R, buffer_size: usize) -> Self {
        Self {
            source: Source::from_reader(reader, buffer_size),
            token: TokenKind::None,
        }
    }

    /// The current token kind.
    pub fn token(&self) -> TokenKind {
        self.token
    }

    /// Byte length of the current token.
    pub fn scan_len(&self) -> usize {
        self.source.scan_len()
    }

    /// Materialize `len` bytes of the current token, starting `skip`
    /// bytes past the token start, into `dest`.
    pub fn copy_token(&self, skip: usize, len: usize, dest: &mut Vec<u8>) {
        self.source.copy_token(skip, len, dest);
    }

    /// Advance to the next token and return its kind.
    ///
    /// Returns [`TokenKind::None`] at end of input or on a byte no
    /// matcher accepts.
    ///
    /// # Errors
    ///
    /// Reports [`LexError::TokenTooLong`](crate::LexError::TokenTooLong)
    /// when a token spans more than two streaming buffers.
    pub fn advance(&mut self) -> Result<TokenKind> {
        self.skip_empty()?;
        self.source.advance_start();

        let kind = match self.source.peek() {
            None => TokenKind::None,
            Some(b'(') => {
                self.source.advance()?;
                TokenKind::LParen
            }
            Some(b')') => {
                self.source.advance()?;
                TokenKind::RParen
            }
            Some(b'\'') => {
                self.source.advance()?;
                TokenKind::Quote
            }
            Some(_) => {
                if self.match_string()? {
                    TokenKind::String
                } else if self.match_float()? {
                    TokenKind::Float
                } else if self.match_int()? {
                    TokenKind::Int
                } else if self.match_symbol()? {
                    TokenKind::Symbol
                } else {
                    TokenKind::None
                }
            }
        };

        self.token = kind;
        Ok(kind)
    }

    /// Skip whitespace and `;`-to-newline comments.
    ///
    /// The token-start cursor is kept in lockstep with the scan cursor
    /// here so that arbitrarily long gaps can cross buffers without
    /// tripping the two-buffer token limit.
    fn skip_empty(&mut self) -> Result<()> {
        loop {
            self.source.advance_start();
            match self.source.peek() {
                Some(b) if is_space(b) => {
                    self.source.advance()?;
                }
                Some(b';') => {
                    while let Some(b) = self.source.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.source.advance()?;
                        self.source.advance_start();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn match_string(&mut self) -> Result<bool> {
        self.source.restart_scan();
        if self.source.peek() != Some(b'"') {
            return Ok(false);
        }
        self.source.advance()?;
        loop {
            match self.source.peek() {
                // strings may not contain newlines and must terminate
                None | Some(b'\n') => return Ok(false),
                Some(b'"') => {
                    self.source.advance()?;
                    return Ok(true);
                }
                Some(_) => {
                    self.source.advance()?;
                }
            }
        }
    }

    /// Consume an optional sign and require a digit under the cursor.
    fn match_sign_and_digit(&mut self) -> Result<bool> {
        match self.source.peek() {
            Some(b) if b.is_ascii_digit() => Ok(true),
            Some(b'+') | Some(b'-') => {
                self.source.advance()?;
                Ok(matches!(self.source.peek(), Some(b) if b.is_ascii_digit()))
            }
            _ => Ok(false),
        }
    }

    fn match_float(&mut self) -> Result<bool> {
        self.source.restart_scan();
        if !self.match_sign_and_digit()? {
            return Ok(false);
        }
        self.source.advance()?;
        let mut found_decimal = false;
        while let Some(b) = self.source.peek() {
            if b == b'.' {
                found_decimal = true;
            } else if !b.is_ascii_digit() {
                break;
            }
            self.source.advance()?;
        }
        // without a decimal point this is an int match
        Ok(found_decimal)
    }

    fn match_int(&mut self) -> Result<bool> {
        self.source.restart_scan();
        if !self.match_sign_and_digit()? {
            return Ok(false);
        }
        self.source.advance()?;
        while let Some(b) = self.source.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            self.source.advance()?;
        }
        Ok(true)
    }

    fn match_symbol(&mut self) -> Result<bool> {
        self.source.restart_scan();
        match self.source.peek() {
            Some(b) if is_symbol_byte(b) => {}
            _ => return Ok(false),
        }
        self.source.advance()?;
        while let Some(b) = self.source.peek() {
            if !is_symbol_byte(b) {
                break;
            }
            self.source.advance()?;
        }
        Ok(true)
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Symbol bytes: ASCII `!`..=`z` excluding the structural characters.
fn is_symbol_byte(b: u8) -> bool {
    (b'!'..=b'z').contains(&b) && !matches!(b, b'(' | b')' | b'#' | b';')
}
