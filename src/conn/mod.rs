pub mod connection;
pub mod transport;

pub use connection::{ConnectError, Connection, ConnectionState, SendError};
