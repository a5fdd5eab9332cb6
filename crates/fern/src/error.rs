//! Error types for the interpreter.
//!
//! Every failure in the read, expand, and eval pipelines surfaces as
//! one of these codes through `Result`; nothing panics across the
//! library boundary except the in-language `assert` primitive. The
//! variant order is stable and `Display` gives the stable
//! human-readable string for each code.

use thiserror::Error;

/// The interpreter's error taxonomy.
///
/// Code 0 is the absence of an error (`Ok`); [`Error::code`] numbers
/// the variants from 1 in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A file could not be opened for reading.
    #[error("file error: could not open file")]
    FileOpen,

    /// A `)` appeared with no open list.
    #[error("syntax error: unexpected ) paren")]
    ParenUnexpected,

    /// Input ended inside an unterminated list.
    #[error("syntax error: expected ) paren")]
    ParenExpected,

    /// The lexer produced no usable token.
    #[error("syntax error: bad token")]
    BadToken,

    /// Malformed `(quote x)`.
    #[error("expand error: bad quote")]
    BadQuote,

    /// Malformed `define`.
    #[error("expand error: bad define (define var x)")]
    BadDefine,

    /// Malformed `set!`.
    #[error("expand error: bad set (set! var x)")]
    BadSet,

    /// Malformed `cond` clause.
    #[error("expand error: bad cond")]
    BadCond,

    /// `and` with no arguments or malformed.
    #[error("expand error: bad and (and a b)")]
    BadAnd,

    /// `or` with no arguments or malformed.
    #[error("expand error: bad or (or a b)")]
    BadOr,

    /// Malformed `let` binding list.
    #[error("expand error: bad let")]
    BadLet,

    /// Malformed `lambda` argument list.
    #[error("expand error: bad lambda")]
    BadLambda,

    /// A symbol had no binding in the environment chain.
    #[error("eval error: unknown variable")]
    UnknownVar,

    /// The operator of an application was not callable.
    #[error("eval error: application was not an operator")]
    BadOp,

    /// A primitive rejected an argument.
    #[error("func error: bad argument type")]
    BadArg,

    /// The evaluator saw a value it cannot evaluate.
    #[error("eval error: got into a bad state")]
    UnknownEval,
}

impl Error {
    /// Stable numeric code for this error, starting at 1.
    ///
    /// Code 0 is reserved for "no error", which the API expresses as
    /// `Ok`.
    pub fn code(self) -> u8 {
        self as u8 + 1
    }
}

impl From<fern_lex::LexError> for Error {
    fn from(_: fern_lex::LexError) -> Self {
        Error::BadToken
    }
}

/// Result type alias for interpreter operations.
pub type Result<T> = std::result::Result<T, Error>;
