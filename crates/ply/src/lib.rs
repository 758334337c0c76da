//! Streaming PLY parser driving a typed event [`Consumer`].
//!
//! The parser makes one forward pass over the input: it resolves element and
//! property declarations into the consumer's binding tokens while reading
//! the header, then replays the data section through the per-record
//! callbacks. Nothing is buffered beyond the current record.

mod consumer;
mod header;
mod parser;

pub use consumer::*;
pub use header::*;
pub use parser::*;
