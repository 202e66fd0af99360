// Media server integration

mod adapter;
mod event;

pub use adapter::*;
pub use event::*;
