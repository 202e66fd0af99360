// HTTP control surface

mod page;
mod routes;
mod server;

pub use page::*;
pub use routes::*;
pub use server::*;
