pub mod checkin;
pub mod engine;
pub mod team;

pub use checkin::*;
pub use engine::*;
pub use team::*;
