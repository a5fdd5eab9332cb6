//! Environments — ordered chains of frame tables.
//!
//! An environment is a pair-list whose cars are tables; the head is the
//! innermost frame. Lookup walks the chain head to tail and the first
//! hit wins, which is what gives lambda frames precedence over the
//! globals they shadow.

use crate::context::Context;
use crate::error::Result;
use crate::object;
use crate::value::Value;

impl Context {
    /// Wrap a table as a one-frame environment.
    pub fn make_env(&mut self, table: Value) -> Value {
        self.cons(table, Value::Null)
    }

    /// Prepend a frame to an environment chain.
    pub fn env_extend(&mut self, env: Value, table: Value) -> Value {
        self.cons(table, env)
    }

    /// Find the binding entry for a symbol; null when unbound.
    pub fn env_lookup(&self, env: Value, symbol: Value) -> Value {
        let mut it = env;
        while !it.is_null() {
            let entry = self.table_get(self.car(it), symbol);
            if !entry.is_null() {
                return entry;
            }
            it = self.cdr(it);
        }
        Value::Null
    }

    /// Bind a symbol in the innermost frame.
    pub fn env_define(&mut self, env: Value, symbol: Value, value: Value) -> Result<()> {
        let frame = self.car(env);
        self.table_set(frame, symbol, value)
    }

    /// Mutate an existing binding anywhere in the chain.
    ///
    /// An unbound symbol is diagnosed and the mutation skipped;
    /// evaluation continues. This matches the language's long-standing
    /// behavior, rough edge and all.
    pub fn env_set(&mut self, env: Value, symbol: Value, value: Value) {
        match self.env_lookup(env, symbol) {
            Value::Pair(entry) => object::set_pair_cdr(&mut self.heap, entry, value),
            _ => log::warn!("set! of unknown variable: {}", self.display(symbol)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx() -> Context {
        Context::reader(Config::default())
    }

    #[test]
    fn test_define_then_lookup() {
        let mut ctx = ctx();
        let table = ctx.make_table(8);
        let env = ctx.make_env(table);
        let x = ctx.make_symbol("x");
        ctx.env_define(env, x, Value::Int(1)).unwrap();
        let entry = ctx.env_lookup(env, x);
        assert_eq!(ctx.cdr(entry), Value::Int(1));
    }

    #[test]
    fn test_inner_frame_shadows_outer() {
        let mut ctx = ctx();
        let outer_table = ctx.make_table(8);
        let outer = ctx.make_env(outer_table);
        let x = ctx.make_symbol("x");
        ctx.env_define(outer, x, Value::Int(1)).unwrap();

        let inner_table = ctx.make_table(8);
        let inner = ctx.env_extend(outer, inner_table);
        ctx.env_define(inner, x, Value::Int(2)).unwrap();

        let entry = ctx.env_lookup(inner, x);
        assert_eq!(ctx.cdr(entry), Value::Int(2));
        // the outer binding is untouched
        let entry = ctx.env_lookup(outer, x);
        assert_eq!(ctx.cdr(entry), Value::Int(1));
    }

    #[test]
    fn test_set_walks_the_chain() {
        let mut ctx = ctx();
        let outer_table = ctx.make_table(8);
        let outer = ctx.make_env(outer_table);
        let x = ctx.make_symbol("x");
        ctx.env_define(outer, x, Value::Int(1)).unwrap();

        let inner_table = ctx.make_table(8);
        let inner = ctx.env_extend(outer, inner_table);
        ctx.env_set(inner, x, Value::Int(9));

        let entry = ctx.env_lookup(outer, x);
        assert_eq!(ctx.cdr(entry), Value::Int(9));
    }

    #[test]
    fn test_set_of_unbound_is_skipped() {
        let mut ctx = ctx();
        let table = ctx.make_table(8);
        let env = ctx.make_env(table);
        let x = ctx.make_symbol("x");
        // no binding exists; the set is diagnosed and dropped
        ctx.env_set(env, x, Value::Int(1));
        assert_eq!(ctx.env_lookup(env, x), Value::Null);
    }

    #[test]
    fn test_lookup_in_empty_env() {
        let mut ctx = ctx();
        let x = ctx.make_symbol("x");
        assert_eq!(ctx.env_lookup(Value::Null, x), Value::Null);
    }
}
