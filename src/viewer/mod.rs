// Viewer WebSocket transport

mod connection;
mod server;

pub use connection::*;
pub use server::*;
