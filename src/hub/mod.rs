// Broadcast hub for the dashboard viewers

mod broadcast;
mod message;

pub use broadcast::*;
pub use message::*;
