// Dashboard server

mod config;
mod context;
mod signal;
mod supervisor;

pub use config::*;
pub use context::*;
pub use signal::*;
pub use supervisor::*;
