pub mod carrier;
pub mod input;
pub mod mechanics;
pub mod player;
pub mod state;

pub use carrier::*;
pub use input::*;
pub use mechanics::*;
pub use player::*;
pub use state::*;
