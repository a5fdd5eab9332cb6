//! Block payload layouts.
//!
//! Every heap object is a block: an 8-byte [`header`] followed by an
//! inline payload. This module fixes the payload layout per type and
//! provides the raw readers and writers the context and the collector
//! share. All offsets are relative to the block address.
//!
//! | Type   | Payload |
//! |--------|---------|
//! | Pair   | car value, cdr value |
//! | Symbol | hash `u32`, uppercase name bytes |
//! | String | bytes |
//! | Lambda | identifier `u32`, args value, body value, env value |
//! | Table  | size `u32`, capacity `u32`, `capacity` bucket values |

pub(crate) mod header;

use crate::heap::{Addr, Heap};
use crate::value::{Value, VALUE_SIZE};

use header::HEADER_SIZE;

/// Payload size of a pair block.
pub(crate) const PAIR_PAYLOAD: usize = 2 * VALUE_SIZE;

/// Payload size of a lambda block.
pub(crate) const LAMBDA_PAYLOAD: usize = 4 + 3 * VALUE_SIZE;

/// Payload size of a table block with the given bucket count.
pub(crate) fn table_payload(capacity: u32) -> usize {
    8 + capacity as usize * VALUE_SIZE
}

// === Pairs ===

pub(crate) fn pair_car(heap: &Heap, block: Addr) -> Value {
    heap.read_value(block.offset(HEADER_SIZE))
}

pub(crate) fn pair_cdr(heap: &Heap, block: Addr) -> Value {
    heap.read_value(block.offset(HEADER_SIZE + VALUE_SIZE))
}

pub(crate) fn set_pair_car(heap: &mut Heap, block: Addr, value: Value) {
    heap.write_value(block.offset(HEADER_SIZE), value);
}

pub(crate) fn set_pair_cdr(heap: &mut Heap, block: Addr, value: Value) {
    heap.write_value(block.offset(HEADER_SIZE + VALUE_SIZE), value);
}

// === Symbols ===

pub(crate) fn symbol_hash(heap: &Heap, block: Addr) -> u32 {
    heap.read_u32(block.offset(HEADER_SIZE))
}

/// The interned (uppercase) name bytes.
pub(crate) fn symbol_name(heap: &Heap, block: Addr) -> &[u8] {
    let len = heap.header(block).len as usize - 4;
    heap.bytes(block.offset(HEADER_SIZE + 4), len)
}

pub(crate) fn write_symbol(heap: &mut Heap, block: Addr, hash: u32, name: &[u8]) {
    heap.write_u32(block.offset(HEADER_SIZE), hash);
    heap.bytes_mut(block.offset(HEADER_SIZE + 4), name.len())
        .copy_from_slice(name);
}

// === Strings ===

pub(crate) fn string_bytes(heap: &Heap, block: Addr) -> &[u8] {
    let len = heap.header(block).len as usize;
    heap.bytes(block.offset(HEADER_SIZE), len)
}

pub(crate) fn write_string(heap: &mut Heap, block: Addr, bytes: &[u8]) {
    heap.bytes_mut(block.offset(HEADER_SIZE), bytes.len())
        .copy_from_slice(bytes);
}

// === Lambdas ===

/// Decoded lambda payload.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LambdaParts {
    pub identifier: u32,
    pub args: Value,
    pub body: Value,
    pub env: Value,
}

pub(crate) fn lambda_parts(heap: &Heap, block: Addr) -> LambdaParts {
    LambdaParts {
        identifier: heap.read_u32(block.offset(HEADER_SIZE)),
        args: heap.read_value(block.offset(HEADER_SIZE + 4)),
        body: heap.read_value(block.offset(HEADER_SIZE + 4 + VALUE_SIZE)),
        env: heap.read_value(block.offset(HEADER_SIZE + 4 + 2 * VALUE_SIZE)),
    }
}

pub(crate) fn write_lambda(heap: &mut Heap, block: Addr, parts: &LambdaParts) {
    heap.write_u32(block.offset(HEADER_SIZE), parts.identifier);
    heap.write_value(block.offset(HEADER_SIZE + 4), parts.args);
    heap.write_value(block.offset(HEADER_SIZE + 4 + VALUE_SIZE), parts.body);
    heap.write_value(block.offset(HEADER_SIZE + 4 + 2 * VALUE_SIZE), parts.env);
}

// === Tables ===

pub(crate) fn table_size(heap: &Heap, block: Addr) -> u32 {
    heap.read_u32(block.offset(HEADER_SIZE))
}

pub(crate) fn set_table_size(heap: &mut Heap, block: Addr, size: u32) {
    heap.write_u32(block.offset(HEADER_SIZE), size);
}

pub(crate) fn table_capacity(heap: &Heap, block: Addr) -> u32 {
    heap.read_u32(block.offset(HEADER_SIZE + 4))
}

pub(crate) fn table_bucket(heap: &Heap, block: Addr, index: u32) -> Value {
    heap.read_value(block.offset(HEADER_SIZE + 8 + index as usize * VALUE_SIZE))
}

pub(crate) fn set_table_bucket(heap: &mut Heap, block: Addr, index: u32, value: Value) {
    heap.write_value(
        block.offset(HEADER_SIZE + 8 + index as usize * VALUE_SIZE),
        value,
    );
}

/// Write a table's counters and clear every bucket to null.
pub(crate) fn init_table(heap: &mut Heap, block: Addr, size: u32, capacity: u32) {
    heap.write_u32(block.offset(HEADER_SIZE), size);
    heap.write_u32(block.offset(HEADER_SIZE + 4), capacity);
    for index in 0..capacity {
        set_table_bucket(heap, block, index, Value::Null);
    }
}
