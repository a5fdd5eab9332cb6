//! The standard primitive library.
//!
//! Installed by the interpreter constructor into the global frame.
//! Arithmetic folds left and takes the type of the first operand,
//! coercing the rest; integer arithmetic wraps; comparisons return
//! `1`/`0` ints. `=`, `EVEN?`, and `ODD?` compare through integer
//! coercion.

use crate::context::{Context, PrimitiveFn};
use crate::error::{Error, Result};
use crate::list::ListBuilder;
use crate::value::Value;

/// The primitive table, in registration order.
pub(crate) const BUILTINS: &[(&str, PrimitiveFn)] = &[
    ("CONS", builtin_cons),
    ("CAR", builtin_car),
    ("CDR", builtin_cdr),
    ("NAV", builtin_nav),
    ("EQ?", builtin_eq),
    ("NULL?", builtin_is_null),
    ("LIST", builtin_list),
    ("APPEND", builtin_append),
    ("MAP", builtin_map),
    ("NTH", builtin_nth),
    ("LENGTH", builtin_length),
    ("REVERSE!", builtin_reverse),
    ("ASSOC", builtin_assoc),
    ("DISPLAY", builtin_display),
    ("NEWLINE", builtin_newline),
    ("ASSERT", builtin_assert),
    ("READ-PATH", builtin_read_path),
    ("EXPAND", builtin_expand),
    ("=", builtin_equals),
    ("+", builtin_add),
    ("-", builtin_sub),
    ("*", builtin_mul),
    ("/", builtin_div),
    ("<", builtin_less),
    (">", builtin_greater),
    ("<=", builtin_less_equal),
    (">=", builtin_greater_equal),
    ("EVEN?", builtin_even),
    ("ODD?", builtin_odd),
];

/// Bind the `NULL` constant and every primitive in `table`.
pub(crate) fn install(ctx: &mut Context, table: Value) {
    let null_sym = ctx.make_symbol("NULL");
    ctx.table_set_symbol(table, null_sym, Value::Null);
    for (name, func) in BUILTINS {
        let symbol = ctx.make_symbol(name);
        let value = ctx.register_func(*func);
        ctx.table_set_symbol(table, symbol, value);
    }
}

fn builtin_cons(args: Value, ctx: &mut Context) -> Result<Value> {
    let car = ctx.car(args);
    let cdr = ctx.car(ctx.cdr(args));
    Ok(ctx.cons(car, cdr))
}

fn builtin_car(args: Value, ctx: &mut Context) -> Result<Value> {
    Ok(ctx.car(ctx.car(args)))
}

fn builtin_cdr(args: Value, ctx: &mut Context) -> Result<Value> {
    Ok(ctx.cdr(ctx.car(args)))
}

fn builtin_nav(args: Value, ctx: &mut Context) -> Result<Value> {
    let path = ctx.car(args);
    let target = ctx.car(ctx.cdr(args));
    Ok(ctx.nav(target, ctx.string_str(path)))
}

fn builtin_eq(args: Value, ctx: &mut Context) -> Result<Value> {
    let a = ctx.car(args);
    let b = ctx.car(ctx.cdr(args));
    Ok(Value::Int(i64::from(a == b)))
}

fn builtin_is_null(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut it = args;
    while !it.is_null() {
        if !ctx.car(it).is_null() {
            return Ok(Value::Int(0));
        }
        it = ctx.cdr(it);
    }
    Ok(Value::Int(1))
}

fn builtin_list(args: Value, _ctx: &mut Context) -> Result<Value> {
    Ok(args)
}

fn builtin_append(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut list = ctx.car(args);
    if !list.is_pair() {
        return Err(Error::BadArg);
    }
    let mut it = ctx.cdr(args);
    while !it.is_null() {
        let tail = ctx.car(it);
        list = ctx.append(list, tail);
        it = ctx.cdr(it);
    }
    Ok(list)
}

/// Apply an operator to every element. Several lists map independently
/// and return a list of result lists; one list returns its results
/// directly. An error while evaluating an element is discarded and the
/// element maps to null.
fn builtin_map(args: Value, ctx: &mut Context) -> Result<Value> {
    let op = ctx.car(args);
    if !matches!(op, Value::Func(_) | Value::Lambda(_)) {
        return Err(Error::BadArg);
    }
    let lists = ctx.cdr(args);
    let count = ctx.length(lists);
    if count == 0 {
        return Ok(Value::Null);
    }

    let results = ctx.make_list(Value::Null, count);
    let mut result_it = results;
    let mut lists_it = lists;
    while !lists_it.is_null() {
        let mut mapped = ListBuilder::new();
        let mut it = ctx.car(lists_it);
        while !it.is_null() {
            let item = ctx.car(it);
            let tail = ctx.cons(item, Value::Null);
            let call = ctx.cons(op, tail);
            let env = ctx.global_env();
            let value = ctx.eval(call, env).unwrap_or(Value::Null);
            mapped.push(ctx, value);
            it = ctx.cdr(it);
        }
        let mapped = mapped.finish();
        ctx.set_car(result_it, mapped);
        lists_it = ctx.cdr(lists_it);
        result_it = ctx.cdr(result_it);
    }

    if count == 1 {
        Ok(ctx.car(results))
    } else {
        Ok(results)
    }
}

fn builtin_nth(args: Value, ctx: &mut Context) -> Result<Value> {
    let index = ctx.car(args);
    let list = ctx.car(ctx.cdr(args));
    Ok(ctx.at_index(list, index.as_int().max(0) as usize))
}

fn builtin_length(args: Value, ctx: &mut Context) -> Result<Value> {
    Ok(Value::Int(ctx.length(ctx.car(args)) as i64))
}

fn builtin_reverse(args: Value, ctx: &mut Context) -> Result<Value> {
    let list = ctx.car(args);
    Ok(ctx.reverse_inplace(list))
}

fn builtin_assoc(args: Value, ctx: &mut Context) -> Result<Value> {
    let list = ctx.car(args);
    let key = ctx.car(ctx.cdr(args));
    Ok(ctx.assoc(list, key))
}

fn builtin_display(args: Value, ctx: &mut Context) -> Result<Value> {
    let value = ctx.car(args);
    match value {
        Value::String(_) => print!("{}", ctx.string_str(value)),
        _ => ctx.print(value),
    }
    Ok(Value::Null)
}

fn builtin_newline(_args: Value, _ctx: &mut Context) -> Result<Value> {
    println!();
    Ok(Value::Null)
}

/// In-language assertion: fatal by design. The quoted source form
/// (attached by the expander) is reported before the panic.
fn builtin_assert(args: Value, ctx: &mut Context) -> Result<Value> {
    if ctx.car(args).as_int() != 1 {
        let quoted = ctx.car(ctx.cdr(args));
        log::error!("assertion: {}", ctx.display(quoted));
        panic!("assertion failed: {}", ctx.display(quoted));
    }
    Ok(Value::Null)
}

fn builtin_read_path(args: Value, ctx: &mut Context) -> Result<Value> {
    let path = ctx.string_str(ctx.car(args)).to_owned();
    ctx.read_path(&path)
}

fn builtin_expand(args: Value, ctx: &mut Context) -> Result<Value> {
    let expr = ctx.car(args);
    ctx.expand(expr)
}

fn builtin_equals(args: Value, ctx: &mut Context) -> Result<Value> {
    let first = ctx.car(args);
    if first.is_null() {
        return Ok(Value::Int(1));
    }
    let mut it = ctx.cdr(args);
    while !it.is_null() {
        if ctx.car(it).as_int() != first.as_int() {
            return Ok(Value::Int(0));
        }
        it = ctx.cdr(it);
    }
    Ok(Value::Int(1))
}

fn builtin_add(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut accum = ctx.car(args);
    let mut it = ctx.cdr(args);
    while !it.is_null() {
        let x = ctx.car(it);
        accum = match accum {
            Value::Int(n) => Value::Int(n.wrapping_add(x.as_int())),
            Value::Float(f) => Value::Float(f + x.as_float()),
            other => other,
        };
        it = ctx.cdr(it);
    }
    Ok(accum)
}

fn builtin_sub(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut accum = ctx.car(args);
    let mut it = ctx.cdr(args);
    while !it.is_null() {
        let x = ctx.car(it);
        accum = match accum {
            Value::Int(n) => Value::Int(n.wrapping_sub(x.as_int())),
            Value::Float(f) => Value::Float(f - x.as_float()),
            _ => return Err(Error::BadArg),
        };
        it = ctx.cdr(it);
    }
    Ok(accum)
}

fn builtin_mul(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut accum = ctx.car(args);
    let mut it = ctx.cdr(args);
    while !it.is_null() {
        let x = ctx.car(it);
        accum = match accum {
            Value::Int(n) => Value::Int(n.wrapping_mul(x.as_int())),
            Value::Float(f) => Value::Float(f * x.as_float()),
            _ => return Err(Error::BadArg),
        };
        it = ctx.cdr(it);
    }
    Ok(accum)
}

fn builtin_div(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut accum = ctx.car(args);
    let mut it = ctx.cdr(args);
    while !it.is_null() {
        let x = ctx.car(it);
        accum = match accum {
            Value::Int(n) => Value::Int(n.checked_div(x.as_int()).ok_or(Error::BadArg)?),
            Value::Float(f) => Value::Float(f / x.as_float()),
            _ => return Err(Error::BadArg),
        };
        it = ctx.cdr(it);
    }
    Ok(accum)
}

fn builtin_less(args: Value, ctx: &mut Context) -> Result<Value> {
    let a = ctx.car(args);
    let b = ctx.car(ctx.cdr(args));
    match a {
        Value::Int(n) => Ok(Value::Int(i64::from(n < b.as_int()))),
        Value::Float(f) => Ok(Value::Int(i64::from(f < b.as_float()))),
        _ => Err(Error::BadArg),
    }
}

fn builtin_greater(args: Value, ctx: &mut Context) -> Result<Value> {
    let a = ctx.car(args);
    let b = ctx.car(ctx.cdr(args));
    match a {
        Value::Int(n) => Ok(Value::Int(i64::from(n > b.as_int()))),
        Value::Float(f) => Ok(Value::Int(i64::from(f > b.as_float()))),
        _ => Err(Error::BadArg),
    }
}

fn builtin_less_equal(args: Value, ctx: &mut Context) -> Result<Value> {
    let greater = builtin_greater(args, ctx)?;
    Ok(Value::Int(i64::from(greater.as_int() == 0)))
}

fn builtin_greater_equal(args: Value, ctx: &mut Context) -> Result<Value> {
    let less = builtin_less(args, ctx)?;
    Ok(Value::Int(i64::from(less.as_int() == 0)))
}

fn builtin_even(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut it = args;
    while !it.is_null() {
        if ctx.car(it).as_int() & 1 == 1 {
            return Ok(Value::Int(0));
        }
        it = ctx.cdr(it);
    }
    Ok(Value::Int(1))
}

fn builtin_odd(args: Value, ctx: &mut Context) -> Result<Value> {
    let mut it = args;
    while !it.is_null() {
        if ctx.car(it).as_int() & 1 == 0 {
            return Ok(Value::Int(0));
        }
        it = ctx.cdr(it);
    }
    Ok(Value::Int(1))
}
