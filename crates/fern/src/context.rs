//! The interpreter context.
//!
//! A [`Context`] owns everything: the two heap spaces, the symbol
//! interner table, the global environment, the primitive registry, and
//! the lambda identifier counter. There is no process-global state;
//! every operation threads the context explicitly, and a context must
//! stay on the thread that uses it (`&mut` ownership is the contract).

use crate::builtin;
use crate::config::Config;
use crate::error::Result;
use crate::heap::{Addr, Heap};
use crate::object::{self, LambdaParts, LAMBDA_PAYLOAD, PAIR_PAYLOAD};
use crate::value::{Type, Value};

/// Signature of a host primitive.
///
/// A primitive receives its already-evaluated argument list and the
/// context; returning an error unwinds evaluation to the `eval` entry
/// point.
pub type PrimitiveFn = fn(Value, &mut Context) -> Result<Value>;

/// An evaluation context.
pub struct Context {
    /// Active space; all live references point here.
    pub(crate) heap: Heap,
    /// Collector target space.
    pub(crate) to_heap: Heap,
    /// Interner table, always a collection root.
    pub(crate) symbol_table: Value,
    /// Global environment chain, always a collection root.
    pub(crate) global_env: Value,
    pub(crate) lambda_counter: u32,
    /// Host primitives, addressed by `Value::Func` indices.
    pub(crate) primitives: Vec<PrimitiveFn>,
    pub(crate) config: Config,
}

impl Context {
    /// Context with the standard primitive library installed as the
    /// global environment frame.
    pub fn interpreter(config: Config) -> Self {
        let mut ctx = Self::raw(config);
        let table = ctx.make_table(ctx.config.global_table_capacity);
        builtin::install(&mut ctx, table);
        ctx.global_env = ctx.make_env(table);
        ctx
    }

    /// Context with no primitives, for tools that only read and expand.
    pub fn reader(config: Config) -> Self {
        Self::raw(config)
    }

    fn raw(config: Config) -> Self {
        let config = config.normalized();
        let mut ctx = Self {
            heap: Heap::new(config.page_size),
            to_heap: Heap::new(config.page_size),
            symbol_table: Value::Null,
            global_env: Value::Null,
            lambda_counter: 0,
            primitives: Vec::new(),
            config,
        };
        ctx.symbol_table = ctx.make_table(ctx.config.symbol_table_capacity);
        ctx
    }

    /// The global environment (a one-frame chain after `interpreter`,
    /// null after `reader`).
    pub fn global_env(&self) -> Value {
        self.global_env
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Bytes currently held by live and dead blocks together; shrinks
    /// at collection.
    pub fn heap_used(&self) -> usize {
        self.heap.used()
    }

    pub(crate) fn alloc(&mut self, kind: Type, payload_len: usize) -> Addr {
        self.heap
            .alloc(kind, crate::object::header::GC_CLEAR, payload_len)
    }

    // === Pairs ===

    /// Allocate a pair.
    pub fn cons(&mut self, car: Value, cdr: Value) -> Value {
        let block = self.alloc(Type::Pair, PAIR_PAYLOAD);
        object::set_pair_car(&mut self.heap, block, car);
        object::set_pair_cdr(&mut self.heap, block, cdr);
        Value::Pair(block)
    }

    /// First element of a pair; null for anything else.
    pub fn car(&self, value: Value) -> Value {
        match value {
            Value::Pair(block) => object::pair_car(&self.heap, block),
            _ => Value::Null,
        }
    }

    /// Second element of a pair; null for anything else.
    pub fn cdr(&self, value: Value) -> Value {
        match value {
            Value::Pair(block) => object::pair_cdr(&self.heap, block),
            _ => Value::Null,
        }
    }

    /// Replace a pair's car; no-op on non-pairs.
    pub fn set_car(&mut self, value: Value, car: Value) {
        if let Value::Pair(block) = value {
            object::set_pair_car(&mut self.heap, block, car);
        }
    }

    /// Replace a pair's cdr; no-op on non-pairs.
    pub fn set_cdr(&mut self, value: Value, cdr: Value) {
        if let Value::Pair(block) = value {
            object::set_pair_cdr(&mut self.heap, block, cdr);
        }
    }

    // === Strings ===

    pub fn make_string(&mut self, text: &str) -> Value {
        let bytes = text.as_bytes();
        let block = self.alloc(Type::String, bytes.len());
        object::write_string(&mut self.heap, block, bytes);
        Value::String(block)
    }

    /// String contents; empty for non-strings.
    pub fn string_str(&self, value: Value) -> &str {
        match value {
            Value::String(block) => {
                std::str::from_utf8(object::string_bytes(&self.heap, block)).unwrap_or("")
            }
            _ => "",
        }
    }

    // === Lambdas ===

    pub fn make_lambda(&mut self, args: Value, body: Value, env: Value) -> Value {
        let identifier = self.lambda_counter;
        self.lambda_counter += 1;
        let block = self.alloc(Type::Lambda, LAMBDA_PAYLOAD);
        object::write_lambda(
            &mut self.heap,
            block,
            &LambdaParts {
                identifier,
                args,
                body,
                env,
            },
        );
        Value::Lambda(block)
    }

    // === Primitives ===

    /// Register a host primitive and return the value naming it.
    pub fn register_func(&mut self, func: PrimitiveFn) -> Value {
        let index = self.primitives.len() as u32;
        self.primitives.push(func);
        Value::Func(index)
    }
}
