//! The reader: token stream to value tree.
//!
//! Recursive descent over the lexer's tokens. Atom text is materialized
//! through the lexer's scratch-copy interface, so the reader owns the
//! only allocation per atom (the heap block or parsed scalar).
//!
//! A program with more than one top-level form reads as a single
//! `(begin form ...)`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use fern_lex::{Lexer, TokenKind};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::list::ListBuilder;
use crate::value::Value;

impl Context {
    /// Read program text into a value tree.
    pub fn read(&mut self, text: &str) -> Result<Value> {
        let mut lexer = Lexer::new(text);
        self.parse(&mut lexer)
    }

    /// Read a program streamed from a reader (a file handle, usually).
    ///
    /// The stream is lexed through two fixed-size buffers, so inputs
    /// larger than memory are fine as long as no single token exceeds
    /// two buffers.
    pub fn read_file<R: Read>(&mut self, file: R) -> Result<Value> {
        let buffer_size = self.config.lex_buffer_size;
        let mut lexer = Lexer::from_reader_with_buffer(file, buffer_size);
        self.parse(&mut lexer)
    }

    /// Open and read a program from a path.
    pub fn read_path<P: AsRef<Path>>(&mut self, path: P) -> Result<Value> {
        let file = File::open(path).map_err(|_| Error::FileOpen)?;
        self.read_file(file)
    }

    fn parse(&mut self, lexer: &mut Lexer<'_>) -> Result<Value> {
        let mut scratch = Vec::new();
        lexer.advance()?;
        let first = self.parse_form(lexer, &mut scratch)?;
        if lexer.token() == TokenKind::None {
            return Ok(first);
        }

        // several top-level forms: wrap in (begin ...)
        let begin = self.make_symbol("BEGIN");
        let mut forms = ListBuilder::new();
        forms.push(self, begin);
        forms.push(self, first);
        while lexer.token() != TokenKind::None {
            let form = self.parse_form(lexer, &mut scratch)?;
            forms.push(self, form);
        }
        Ok(forms.finish())
    }

    fn parse_form(&mut self, lexer: &mut Lexer<'_>, scratch: &mut Vec<u8>) -> Result<Value> {
        match lexer.token() {
            TokenKind::None => Err(Error::ParenExpected),
            TokenKind::LParen => {
                lexer.advance()?;
                let mut items = ListBuilder::new();
                while lexer.token() != TokenKind::RParen {
                    if lexer.token() == TokenKind::None {
                        return Err(Error::ParenExpected);
                    }
                    let item = self.parse_form(lexer, scratch)?;
                    items.push(self, item);
                }
                lexer.advance()?;
                Ok(items.finish())
            }
            TokenKind::RParen => Err(Error::ParenUnexpected),
            TokenKind::Quote => {
                lexer.advance()?;
                let inner = self.parse_form(lexer, scratch)?;
                let tail = self.cons(inner, Value::Null);
                let quote = self.make_symbol("QUOTE");
                Ok(self.cons(quote, tail))
            }
            _ => self.parse_atom(lexer, scratch),
        }
    }

    fn parse_atom(&mut self, lexer: &mut Lexer<'_>, scratch: &mut Vec<u8>) -> Result<Value> {
        let len = lexer.scan_len();
        let value = match lexer.token() {
            TokenKind::Int => {
                lexer.copy_token(0, len, scratch);
                Value::Int(parse_int(scratch))
            }
            TokenKind::Float => {
                lexer.copy_token(0, len, scratch);
                Value::Float(parse_float(scratch))
            }
            TokenKind::String => {
                // strip the surrounding quotes
                lexer.copy_token(1, len - 2, scratch);
                let text = std::str::from_utf8(scratch).unwrap_or("");
                self.make_string(text)
            }
            TokenKind::Symbol => {
                lexer.copy_token(0, len, scratch);
                let name = std::str::from_utf8(scratch).unwrap_or("");
                self.make_symbol(name)
            }
            _ => return Err(Error::BadToken),
        };
        lexer.advance()?;
        Ok(value)
    }
}

/// Decimal fold with wraparound on overflow.
fn parse_int(bytes: &[u8]) -> i64 {
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    let mut n: i64 = 0;
    for &b in digits {
        n = n.wrapping_mul(10).wrapping_add(i64::from(b - b'0'));
    }
    if negative {
        n.wrapping_neg()
    } else {
        n
    }
}

/// Convert the leading well-formed prefix (the float token alphabet is
/// digits, signs, and dots; everything from a second dot on is
/// ignored).
fn parse_float(bytes: &[u8]) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = i + 1;
    }
    std::str::from_utf8(&bytes[..end])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx() -> Context {
        Context::reader(Config::default())
    }

    fn shows(ctx: &mut Context, text: &str) -> String {
        let value = ctx.read(text).unwrap();
        ctx.display(value).to_string()
    }

    #[test]
    fn test_atoms() {
        let mut ctx = ctx();
        assert_eq!(shows(&mut ctx, "42"), "42");
        assert_eq!(shows(&mut ctx, "-42"), "-42");
        assert_eq!(shows(&mut ctx, "2.5"), "2.500000");
        assert_eq!(shows(&mut ctx, "\"hi\""), "\"hi\"");
        assert_eq!(shows(&mut ctx, "foo"), "FOO");
    }

    #[test]
    fn test_lists() {
        let mut ctx = ctx();
        assert_eq!(shows(&mut ctx, "(+ 1 2)"), "(+ 1 2)");
        assert_eq!(shows(&mut ctx, "(a (b c) d)"), "(A (B C) D)");
        assert_eq!(shows(&mut ctx, "()"), "NIL");
    }

    #[test]
    fn test_quote_sugar() {
        let mut ctx = ctx();
        assert_eq!(shows(&mut ctx, "'x"), "(QUOTE X)");
        assert_eq!(shows(&mut ctx, "'(a b)"), "(QUOTE (A B))");
    }

    #[test]
    fn test_multiple_forms_wrap_in_begin() {
        let mut ctx = ctx();
        assert_eq!(shows(&mut ctx, "(a) (b)"), "(BEGIN (A) (B))");
        assert_eq!(shows(&mut ctx, "1 2 3"), "(BEGIN 1 2 3)");
    }

    #[test]
    fn test_symbols_fold_to_uppercase_and_intern() {
        let mut ctx = ctx();
        let a = ctx.read("abc").unwrap();
        let b = ctx.read("ABC").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_comments_are_skipped() {
        let mut ctx = ctx();
        assert_eq!(shows(&mut ctx, "; hello\n(a) ; trailing\n"), "(A)");
    }

    #[test]
    fn test_unterminated_list() {
        let mut ctx = ctx();
        assert_eq!(ctx.read("(a b"), Err(Error::ParenExpected));
    }

    #[test]
    fn test_unexpected_close() {
        let mut ctx = ctx();
        assert_eq!(ctx.read(")"), Err(Error::ParenUnexpected));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let mut ctx = ctx();
        assert_eq!(ctx.read(""), Err(Error::ParenExpected));
        assert_eq!(ctx.read("; only a comment\n"), Err(Error::ParenExpected));
    }

    #[test]
    fn test_read_file_streams() {
        let mut ctx = ctx();
        let text = "(define x 1) (define y 2)";
        let value = ctx.read_file(text.as_bytes()).unwrap();
        assert_eq!(
            ctx.display(value).to_string(),
            "(BEGIN (DEFINE X 1) (DEFINE Y 2))"
        );
    }

    #[test]
    fn test_read_path_missing_file() {
        let mut ctx = ctx();
        assert_eq!(
            ctx.read_path("/no/such/file.fern"),
            Err(Error::FileOpen)
        );
    }

    #[test]
    fn test_parse_int_wraps() {
        assert_eq!(parse_int(b"42"), 42);
        assert_eq!(parse_int(b"-42"), -42);
        assert_eq!(parse_int(b"+7"), 7);
        // ten digits past i64::MAX wrap rather than fail
        let big = b"99999999999999999999";
        let _ = parse_int(big);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float(b"1.5"), 1.5);
        assert_eq!(parse_float(b"1."), 1.0);
        assert_eq!(parse_float(b"-2.25"), -2.25);
        // a second dot ends the prefix
        assert_eq!(parse_float(b"1.2.3"), 1.2);
    }
}
