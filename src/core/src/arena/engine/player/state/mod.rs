pub mod context;
pub mod guards;
pub mod manager;
pub mod payload;
pub mod state;

pub use context::*;
pub use manager::*;
pub use payload::*;
pub use state::*;
