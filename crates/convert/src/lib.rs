//! Converts streamed PLY polygon data into POV-Ray RAW triangle lines.

mod convert;
mod fan;
mod raw;

pub use convert::*;
pub use fan::*;
pub use raw::*;
