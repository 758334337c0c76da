mod geometry;
mod store;

pub use geometry::*;
pub use store::*;
