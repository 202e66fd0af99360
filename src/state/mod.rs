// Dashboard state

mod model;
mod store;
mod update;

pub use model::*;
pub use store::*;
pub use update::*;
