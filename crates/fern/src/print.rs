//! Value printing.
//!
//! Printing needs the context (names and structure live on the heap),
//! so `Value` cannot implement `Display` on its own. Instead
//! [`Context::display`] returns an adapter that borrows the context and
//! formats the value, usable anywhere a `Display` is expected.

use std::fmt;
use std::io;

use crate::context::Context;
use crate::object;
use crate::value::Value;

/// Display adapter for a value within its context.
pub struct DisplayValue<'a> {
    ctx: &'a Context,
    value: Value,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self.ctx, self.value, false)
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, ctx: &Context, value: Value, in_cdr: bool) -> fmt::Result {
    match value {
        Value::Null => write!(f, "NIL"),
        Value::Int(n) => write!(f, "{n}"),
        // floats print with six fixed decimals
        Value::Float(x) => write!(f, "{x:.6}"),
        Value::Func(index) => write!(f, "function-{index}"),
        Value::Symbol(_) => f.write_str(ctx.symbol_name(value)),
        Value::String(_) => write!(f, "\"{}\"", ctx.string_str(value)),
        Value::Lambda(block) => {
            write!(f, "lambda-{}", object::lambda_parts(&ctx.heap, block).identifier)
        }
        Value::Table(block) => {
            write!(f, "{{")?;
            let capacity = object::table_capacity(&ctx.heap, block);
            for index in 0..capacity {
                let chain = object::table_bucket(&ctx.heap, block, index);
                if chain.is_null() {
                    continue;
                }
                write_value(f, ctx, chain, false)?;
                write!(f, " ")?;
            }
            write!(f, "}}")
        }
        Value::Pair(block) => {
            if !in_cdr {
                write!(f, "(")?;
            }
            write_value(f, ctx, object::pair_car(&ctx.heap, block), false)?;
            let cdr = object::pair_cdr(&ctx.heap, block);
            if cdr.is_pair() {
                write!(f, " ")?;
                write_value(f, ctx, cdr, true)
            } else {
                if !cdr.is_null() {
                    write!(f, " . ")?;
                    write_value(f, ctx, cdr, false)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Context {
    /// A `Display` adapter for the value.
    pub fn display(&self, value: Value) -> DisplayValue<'_> {
        DisplayValue { ctx: self, value }
    }

    /// Print the value to stdout (no trailing newline).
    pub fn print(&self, value: Value) {
        print!("{}", self.display(value));
    }

    /// Write the value to the given writer.
    pub fn printf<W: io::Write>(&self, out: &mut W, value: Value) -> io::Result<()> {
        write!(out, "{}", self.display(value))
    }
}
