pub mod events;
pub mod resolver;

pub use events::*;
pub use resolver::*;
