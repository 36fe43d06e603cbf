pub mod dash;
pub mod shoot;
pub mod stun;

pub use dash::*;
pub use shoot::*;
pub use stun::*;
