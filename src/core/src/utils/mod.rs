pub mod geometry;
pub mod time;

pub use geometry::*;
pub use time::*;
