pub mod ball;
pub mod collision;
pub mod context;
pub mod effects;
pub mod engine;
pub mod events;
pub mod field;
pub mod player;
pub mod scheduler;

pub use ball::*;
pub use collision::*;
pub use context::*;
pub use effects::*;
pub use engine::*;
pub use events::*;
pub use field::*;
pub use player::*;
pub use scheduler::*;

#[cfg(test)]
mod tests;
