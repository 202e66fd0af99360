// Log file tailing

mod log_tailer;
mod recent;
mod task;

pub use log_tailer::*;
pub use recent::*;
pub use task::*;
