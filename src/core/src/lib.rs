pub mod arena;
pub mod config;
pub mod utils;

pub use arena::*;
pub use config::*;
pub use utils::*;

pub use nalgebra::Vector2;
