//! The copying collector.
//!
//! A Cheney two-space scavenger. Collection runs only when the host
//! asks for it, with exactly one value preserved besides the implicit
//! roots (the symbol table and the global environment):
//!
//! 1. Move the roots to the to-space. Moving a block copies its
//!    payload, then overwrites the old header's length field with the
//!    forwarding address and sets the `moved` flag — a later visit
//!    returns the forwarding address instead of copying twice, which is
//!    also what terminates cycles.
//! 2. Scan the to-space in allocation order. Unvisited pairs and
//!    lambdas get their interior references moved in place; the blocks
//!    a scan step appends are themselves scanned before the scan
//!    pointer reaches the write pointer.
//! 3. Swap the spaces and reset the old one, retaining enough pages to
//!    cover the new live size.
//!
//! Tables are special-cased at move time: this is the only point where
//! a table may resize, so the move rebuilds every bucket chain (in
//! to-space, pre-marked visited) rehashing each key when the capacity
//! changed.

use crate::context::Context;
use crate::heap::Addr;
use crate::object::header::{Header, GC_CLEAR, GC_MOVED, GC_VISITED, HEADER_SIZE};
use crate::object::{self, PAIR_PAYLOAD};
use crate::value::{Type, Value};

/// Load-factor bounds outside which a table resizes during collection.
const LOAD_MAX: f32 = 0.75;
const LOAD_MIN: f32 = 0.1;

fn target_capacity(size: u32, capacity: u32) -> u32 {
    let load = size as f32 / capacity as f32;
    if load > LOAD_MAX || load < LOAD_MIN {
        (size * 3).saturating_sub(1).max(1)
    } else {
        capacity
    }
}

impl Context {
    /// Collect garbage, preserving `root` in addition to the implicit
    /// roots.
    ///
    /// Every other heap reference the host holds is invalid afterwards;
    /// the returned value is the moved root and the only valid handle
    /// (besides what can be re-fetched from the global environment).
    pub fn collect(&mut self, root: Value) -> Value {
        let before = self.heap.used();

        let symbol_table = self.symbol_table;
        self.symbol_table = self.gc_move(symbol_table);
        let global_env = self.global_env;
        self.global_env = self.gc_move(global_env);
        let moved_root = self.gc_move(root);

        self.scavenge();

        std::mem::swap(&mut self.heap, &mut self.to_heap);
        let live = self.heap.used();
        self.to_heap.reset(live);
        log::debug!(
            "collected {} bytes, {} live",
            before.saturating_sub(live),
            live
        );

        moved_root
    }

    fn gc_move(&mut self, value: Value) -> Value {
        match value {
            Value::Pair(block) => Value::Pair(self.move_block(block)),
            Value::Symbol(block) => Value::Symbol(self.move_block(block)),
            Value::String(block) => Value::String(self.move_block(block)),
            Value::Lambda(block) => Value::Lambda(self.move_block(block)),
            Value::Table(block) => Value::Table(self.move_table(block)),
            _ => value,
        }
    }

    /// Copy one block to the to-space and leave a forwarding address
    /// behind. Idempotent per block.
    fn move_block(&mut self, block: Addr) -> Addr {
        let header = self.heap.header(block);
        if header.is_moved() {
            return Addr::new(header.len);
        }
        let payload_len = header.len as usize;
        let dest = self.to_heap.alloc(header.kind, GC_CLEAR, payload_len);
        {
            let (from, to) = (&self.heap, &mut self.to_heap);
            to.bytes_mut(dest.offset(HEADER_SIZE), payload_len)
                .copy_from_slice(from.bytes(block.offset(HEADER_SIZE), payload_len));
        }
        self.heap.set_header(
            block,
            Header {
                kind: header.kind,
                flags: GC_MOVED,
                len: dest.raw(),
            },
        );
        dest
    }

    /// Move a table, resizing it when its load factor is out of bounds.
    ///
    /// Bucket chains are rebuilt from fresh to-space cells marked
    /// `visited` (they already hold to-space references); the
    /// `(symbol . value)` entry pairs move shallowly and the scavenge
    /// forwards their contents later.
    fn move_table(&mut self, block: Addr) -> Addr {
        let header = self.heap.header(block);
        if header.is_moved() {
            return Addr::new(header.len);
        }
        let size = object::table_size(&self.heap, block);
        let capacity = object::table_capacity(&self.heap, block);
        let new_capacity = target_capacity(size, capacity);
        if new_capacity != capacity {
            log::trace!("resizing table {capacity} -> {new_capacity}");
        }

        let dest = self
            .to_heap
            .alloc(Type::Table, GC_CLEAR, object::table_payload(new_capacity));
        object::init_table(&mut self.to_heap, dest, size, new_capacity);
        // forward before walking the buckets so a table reachable from
        // its own entries terminates
        self.heap.set_header(
            block,
            Header {
                kind: Type::Table,
                flags: GC_MOVED,
                len: dest.raw(),
            },
        );

        for index in 0..capacity {
            let mut it = object::table_bucket(&self.heap, block, index);
            while let Value::Pair(cell) = it {
                let entry = object::pair_car(&self.heap, cell);
                let next = object::pair_cdr(&self.heap, cell);
                // the cached hash is still readable: a move only
                // repurposes the header length field, never the payload
                let new_index = if new_capacity == capacity {
                    index
                } else if let Value::Pair(entry_block) = entry {
                    match object::pair_car(&self.heap, entry_block) {
                        Value::Symbol(sym) => object::symbol_hash(&self.heap, sym) % new_capacity,
                        _ => index % new_capacity,
                    }
                } else {
                    index % new_capacity
                };
                let moved_entry = self.gc_move(entry);
                let chain = object::table_bucket(&self.to_heap, dest, new_index);
                let cell_block = self.to_heap.alloc(Type::Pair, GC_VISITED, PAIR_PAYLOAD);
                object::set_pair_car(&mut self.to_heap, cell_block, moved_entry);
                object::set_pair_cdr(&mut self.to_heap, cell_block, chain);
                object::set_table_bucket(&mut self.to_heap, dest, new_index, Value::Pair(cell_block));
                it = next;
            }
        }
        dest
    }

    /// Walk the to-space in allocation order, forwarding interior
    /// references until the scan pointer reaches the write pointer.
    fn scavenge(&mut self) {
        let mut page = 0;
        let mut offset = 0usize;
        loop {
            let (base, used) = self.to_heap.page_span(page);
            if offset < used {
                let block = base.offset(offset);
                let header = self.to_heap.header(block);
                if !header.is_visited() {
                    match header.kind {
                        Type::Pair => {
                            let car = object::pair_car(&self.to_heap, block);
                            let cdr = object::pair_cdr(&self.to_heap, block);
                            let car = self.gc_move(car);
                            let cdr = self.gc_move(cdr);
                            object::set_pair_car(&mut self.to_heap, block, car);
                            object::set_pair_cdr(&mut self.to_heap, block, cdr);
                        }
                        Type::Lambda => {
                            let mut parts = object::lambda_parts(&self.to_heap, block);
                            parts.args = self.gc_move(parts.args);
                            parts.body = self.gc_move(parts.body);
                            parts.env = self.gc_move(parts.env);
                            object::write_lambda(&mut self.to_heap, block, &parts);
                        }
                        // symbols, strings, and tables carry no
                        // unforwarded interior references by this point
                        _ => {}
                    }
                    self.to_heap.or_flags(block, GC_VISITED);
                }
                offset += HEADER_SIZE + header.len as usize;
            } else if page + 1 < self.to_heap.page_count() {
                page += 1;
                offset = 0;
            } else {
                break;
            }
        }
    }
}
