//! Symbol interning.
//!
//! Symbols are case-insensitive: the name is folded to uppercase once
//! at intern time and the stored name is the uppercase form. The
//! interner is itself a managed table (the symbol table), so interned
//! symbols are collection roots by construction. One block exists per
//! distinct folded name, which makes symbol equality a pointer
//! comparison.

use crate::context::Context;
use crate::object;
use crate::value::{Type, Value};

/// Adler-32 over the folded name; cached in the symbol block.
pub(crate) fn adler32(bytes: &[u8]) -> u32 {
    let mut s1: u32 = 1;
    let mut s2: u32 = 0;
    for &b in bytes {
        s1 = (s1 + u32::from(b)) % 65521;
        s2 = (s2 + s1) % 65521;
    }
    (s2 << 16) | s1
}

impl Context {
    /// Intern a symbol, folding the name to uppercase.
    ///
    /// Returns the existing block when the folded name is already
    /// known, so `make_symbol("foo")` and `make_symbol("FOO")` are the
    /// same value.
    pub fn make_symbol(&mut self, name: &str) -> Value {
        let folded = name.to_ascii_uppercase().into_bytes();
        let hash = adler32(&folded);

        if let Value::Pair(entry) = self.intern_lookup(&folded, hash) {
            return object::pair_car(&self.heap, entry);
        }

        let block = self.alloc(Type::Symbol, 4 + folded.len());
        object::write_symbol(&mut self.heap, block, hash, &folded);
        let symbol = Value::Symbol(block);
        let table = self.symbol_table;
        self.table_set_symbol(table, symbol, Value::Null);
        symbol
    }

    /// Probe the interner for a folded name; returns the table entry
    /// pair or null.
    fn intern_lookup(&self, folded: &[u8], hash: u32) -> Value {
        let Value::Table(table) = self.symbol_table else {
            return Value::Null;
        };
        let capacity = object::table_capacity(&self.heap, table);
        let mut it = object::table_bucket(&self.heap, table, hash % capacity);
        while let Value::Pair(cell) = it {
            let entry = object::pair_car(&self.heap, cell);
            if let Value::Pair(entry_block) = entry {
                if let Value::Symbol(sym) = object::pair_car(&self.heap, entry_block) {
                    if object::symbol_name(&self.heap, sym) == folded {
                        return entry;
                    }
                }
            }
            it = object::pair_cdr(&self.heap, cell);
        }
        Value::Null
    }

    /// The interned (uppercase) name; empty for non-symbols.
    pub fn symbol_name(&self, value: Value) -> &str {
        match value {
            Value::Symbol(block) => {
                std::str::from_utf8(object::symbol_name(&self.heap, block)).unwrap_or("")
            }
            _ => "",
        }
    }

    /// Compare a value against an uppercase symbol name.
    pub(crate) fn symbol_is(&self, value: Value, name: &[u8]) -> bool {
        match value {
            Value::Symbol(block) => object::symbol_name(&self.heap, block) == name,
            _ => false,
        }
    }
}
