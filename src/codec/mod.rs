//! Bidirectional wire codec for the RFC2812 line grammar.
//!
//! [`pack_command`] turns a [`Command`] into one protocol-conformant line and
//! [`unpack_line`] turns one received line into an [`crate::event::Event`].
//! Both are pure functions; neither touches the transport. The codec knows
//! the generic grammar only, never what any particular command means.

pub mod decode;
pub mod encode;
mod schema;

pub use decode::unpack_line;
pub use encode::pack_command;

use thiserror::Error;

/// Maximum length of one wire line in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 512;

pub(crate) const LINE_TERMINATOR: &str = "\r\n";

/// An outgoing command: a name plus ordered named arguments.
///
/// Argument insertion order is wire order; the codec never reorders. The
/// names exist for symmetry with decoded events and are not themselves
/// written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<(String, String)>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a named argument. Builder-style.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[(String, String)] {
        &self.args
    }
}

/// An outgoing command violates the wire grammar. Nothing is written when
/// encoding fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("invalid command name `{0}`")]
    BadCommandName(String),
    #[error("argument `{0}` contains a line terminator")]
    EmbeddedTerminator(String),
    #[error("argument `{0}` only fits the trailing position but is not last")]
    UnrepresentableArg(String),
    #[error("encoded line is {0} bytes, the wire limit is {MAX_LINE_LEN}")]
    LineTooLong(usize),
}

/// A received line does not parse per the wire grammar. The line is
/// discarded and the read loop continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,
    #[error("line has no command token")]
    MissingCommand,
}
