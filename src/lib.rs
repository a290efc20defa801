//! Async RFC2812 IRC client engine.
//!
//! Three pieces compose a client:
//!
//! - [`codec`]: pure bidirectional mapping between commands/events and
//!   protocol wire lines.
//! - [`EventDispatcher`]: a per-event handler registry with concurrent,
//!   supervised dispatch.
//! - [`Connection`]: the lifecycle state machine and read loop gluing both
//!   to a TCP or TLS transport.
//!
//! The engine knows the wire grammar, never what a command means; command
//! semantics, registration sugar, and process bootstrapping belong to the
//! application on top.
//!
//! ```no_run
//! use std::sync::Arc;
//! use crabwire::{ClientConfig, Connection, Event, EventDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let events = Arc::new(EventDispatcher::new(tokio::runtime::Handle::current()));
//!     events.add(
//!         "PRIVMSG",
//!         Arc::new(|event: Event| async move {
//!             let nick = event.get("nick").unwrap_or("?").to_string();
//!             let message = event.get("message").unwrap_or("").to_string();
//!             println!("<{nick}> {message}");
//!             anyhow::Ok(())
//!         }),
//!     );
//!     let conn = Connection::new(ClientConfig::default(), events);
//!     conn.run().await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod conn;
pub mod diag;
pub mod dispatch;
pub mod event;

pub use codec::{pack_command, unpack_line, Command, DecodeError, EncodeError, MAX_LINE_LEN};
pub use config::{load_config, save_config, ClientConfig};
pub use conn::{ConnectError, Connection, ConnectionState, SendError};
pub use diag::{Diagnostics, DiagnosticsSnapshot};
pub use dispatch::{EventDispatcher, EventHandler, HandlerId};
pub use event::{Event, Fields, CLIENT_CONNECT, CLIENT_DISCONNECT};
