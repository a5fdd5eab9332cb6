//! Hash tables on the managed heap.
//!
//! A table block holds a fixed array of bucket heads; each bucket is a
//! chain of ordinary pairs whose cars are `(symbol . value)` entry
//! pairs. Because every link is a managed pair, the collector traverses
//! table contents with no special cases beyond the table block itself.
//!
//! Tables never resize during mutation. The only resize point is the
//! collector, which rebuilds each live table at its target capacity
//! while copying it (see the collector module).

use crate::context::{Context, PrimitiveFn};
use crate::error::{Error, Result};
use crate::heap::Addr;
use crate::object;
use crate::value::{Type, Value};

impl Context {
    /// Allocate an empty table with the given bucket count.
    pub fn make_table(&mut self, capacity: u32) -> Value {
        let capacity = capacity.max(1);
        let block = self.alloc(Type::Table, object::table_payload(capacity));
        object::init_table(&mut self.heap, block, 0, capacity);
        Value::Table(block)
    }

    /// Find the `(symbol . value)` entry for `key`; null when absent
    /// (or when `table`/`key` have the wrong types).
    pub fn table_get(&self, table: Value, key: Value) -> Value {
        let Value::Table(block) = table else {
            return Value::Null;
        };
        let Value::Symbol(sym) = key else {
            return Value::Null;
        };
        let capacity = object::table_capacity(&self.heap, block);
        let hash = object::symbol_hash(&self.heap, sym);
        let chain = object::table_bucket(&self.heap, block, hash % capacity);
        self.assoc(chain, key)
    }

    /// Bind `key` to `value`, replacing in place when the key is
    /// present and prepending a fresh entry otherwise.
    pub fn table_set(&mut self, table: Value, key: Value, value: Value) -> Result<()> {
        let Value::Table(block) = table else {
            return Err(Error::BadArg);
        };
        let Value::Symbol(sym) = key else {
            return Err(Error::BadArg);
        };
        let hash = object::symbol_hash(&self.heap, sym);
        self.table_set_raw(block, key, hash, value);
        Ok(())
    }

    /// Infallible variant for interned-symbol keys.
    pub(crate) fn table_set_symbol(&mut self, table: Value, key: Value, value: Value) {
        if let (Value::Table(block), Value::Symbol(sym)) = (table, key) {
            let hash = object::symbol_hash(&self.heap, sym);
            self.table_set_raw(block, key, hash, value);
        }
    }

    fn table_set_raw(&mut self, block: Addr, key: Value, hash: u32, value: Value) {
        let capacity = object::table_capacity(&self.heap, block);
        let index = hash % capacity;
        let chain = object::table_bucket(&self.heap, block, index);
        match self.assoc(chain, key) {
            Value::Pair(entry) => object::set_pair_cdr(&mut self.heap, entry, value),
            _ => {
                let entry = self.cons(key, value);
                let cell = self.cons(entry, chain);
                object::set_table_bucket(&mut self.heap, block, index, cell);
                let size = object::table_size(&self.heap, block);
                object::set_table_size(&mut self.heap, block, size + 1);
            }
        }
    }

    /// Register each primitive and bind it in the table under its
    /// (interned) name.
    pub fn table_add_funcs(&mut self, table: Value, entries: &[(&str, PrimitiveFn)]) -> Result<()> {
        for (name, func) in entries {
            let symbol = self.make_symbol(name);
            let value = self.register_func(*func);
            self.table_set(table, symbol, value)?;
        }
        Ok(())
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
    fn test_get_missing_is_null() {
        let mut ctx = ctx();
        let table = ctx.make_table(8);
        let key = ctx.make_symbol("x");
        assert_eq!(ctx.table_get(table, key), Value::Null);
    }

    #[test]
    fn test_set_then_get() {
        let mut ctx = ctx();
        let table = ctx.make_table(8);
        let key = ctx.make_symbol("x");
        ctx.table_set(table, key, Value::Int(42)).unwrap();
        let entry = ctx.table_get(table, key);
        assert_eq!(ctx.car(entry), key);
        assert_eq!(ctx.cdr(entry), Value::Int(42));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut ctx = ctx();
        let table = ctx.make_table(8);
        let key = ctx.make_symbol("x");
        ctx.table_set(table, key, Value::Int(1)).unwrap();
        let entry = ctx.table_get(table, key);
        ctx.table_set(table, key, Value::Int(2)).unwrap();
        // same entry pair, new cdr
        assert_eq!(ctx.table_get(table, key), entry);
        assert_eq!(ctx.cdr(entry), Value::Int(2));
    }

    #[test]
    fn test_colliding_keys_chain() {
        let mut ctx = ctx();
        // capacity 1: every key lands in the same bucket
        let table = ctx.make_table(1);
        let keys: Vec<Value> = (0..16)
            .map(|i| ctx.make_symbol(&format!("k{i}")))
            .collect();
        for (i, key) in keys.iter().enumerate() {
            ctx.table_set(table, *key, Value::Int(i as i64)).unwrap();
        }
        for (i, key) in keys.iter().enumerate() {
            let entry = ctx.table_get(table, *key);
            assert_eq!(ctx.cdr(entry), Value::Int(i as i64));
        }
    }

    #[test]
    fn test_non_symbol_key_is_rejected() {
        let mut ctx = ctx();
        let table = ctx.make_table(8);
        assert_eq!(
            ctx.table_set(table, Value::Int(1), Value::Int(2)),
            Err(Error::BadArg)
        );
        assert_eq!(
            ctx.table_set(Value::Null, Value::Int(1), Value::Int(2)),
            Err(Error::BadArg)
        );
    }
}
