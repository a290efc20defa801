//! Connection lifecycle: the state machine and read loop driving one
//! persistent server connection.
//!
//! States move `Disconnected -> Connecting -> Connected -> Disconnected`.
//! The transport halves exist exactly while the state is `Connected`.
//! State is published through a watch channel so [`Connection::connected`]
//! never blocks and a read pending in [`Connection::run`] aborts as soon as
//! [`Connection::disconnect`] flips the state.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{watch, Mutex};
use tracing::{debug, trace, warn};

use super::transport;
use crate::codec::{self, Command, EncodeError};
use crate::config::ClientConfig;
use crate::dispatch::EventDispatcher;
use crate::event::Event;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Establishing the transport failed. The connection is left Disconnected.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("connect to {host}:{port} failed")]
    Transport {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
}

/// A synchronous failure surfaced by [`Connection::send`] or
/// [`Connection::send_raw`]. Sending while not Connected is not an error;
/// the line is silently dropped.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("raw line contains an embedded terminator")]
    RawTerminator,
    #[error("transport write failed")]
    Write(#[source] io::Error),
}

/// One persistent client connection to a server.
///
/// Decoded wire lines and the synthetic `CLIENT_CONNECT` /
/// `CLIENT_DISCONNECT` notifications fan out through the supplied
/// [`EventDispatcher`]. All methods take `&self`; `connect` and
/// `disconnect` serialize on the transport locks.
pub struct Connection {
    config: ClientConfig,
    events: Arc<EventDispatcher>,
    reader: Mutex<Option<BufReader<transport::BoxedReader>>>,
    writer: Mutex<Option<transport::BoxedWriter>>,
    state: watch::Sender<ConnectionState>,
}

impl Connection {
    pub fn new(config: ClientConfig, events: Arc<EventDispatcher>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            events,
            reader: Mutex::new(None),
            writer: Mutex::new(None),
            state,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Establish the transport. No-op when already Connected, so calling
    /// twice performs the handshake only once. On success the state is
    /// Connected and `CLIENT_CONNECT` has fired; on failure the state is
    /// back to Disconnected.
    pub async fn connect(&self) -> Result<(), ConnectError> {
        if self.connected() {
            return Ok(());
        }
        let mut reader = self.reader.lock().await;
        let mut writer = self.writer.lock().await;
        if self.connected() {
            return Ok(());
        }

        self.state.send_replace(ConnectionState::Connecting);
        let host = &self.config.host;
        let port = self.config.port;
        debug!(host = %host, port, tls = self.config.tls, "connecting");
        match transport::open(host, port, self.config.tls, self.config.accept_invalid_certs).await
        {
            Ok((read_half, write_half)) => {
                *reader = Some(BufReader::new(read_half));
                *writer = Some(write_half);
                self.state.send_replace(ConnectionState::Connected);
                drop(writer);
                drop(reader);
                debug!(host = %host, port, "connected");
                self.events.trigger(&Event::client_connect(host, port));
                Ok(())
            }
            Err(source) => {
                self.state.send_replace(ConnectionState::Disconnected);
                Err(ConnectError::Transport {
                    host: host.clone(),
                    port,
                    source,
                })
            }
        }
    }

    /// Tear the transport down. No-op when already Disconnected; concurrent
    /// calls fire `CLIENT_DISCONNECT` once. Safe to call from the run loop
    /// or from handlers.
    pub async fn disconnect(&self) {
        if !self.connected() {
            return;
        }
        // Flip the state before touching the locks: a read pending in `run`
        // observes the change, aborts, and releases the reader lock.
        self.state.send_replace(ConnectionState::Disconnected);

        let taken = {
            let mut reader = self.reader.lock().await;
            let mut writer = self.writer.lock().await;
            reader.take();
            writer.take()
        };
        let Some(mut write_half) = taken else {
            // A concurrent disconnect already tore the transport down.
            return;
        };
        if let Err(error) = write_half.shutdown().await {
            debug!(error = %error, "transport shutdown failed");
        }

        let host = &self.config.host;
        let port = self.config.port;
        debug!(host = %host, port, "disconnected");
        self.events.trigger(&Event::client_disconnect(host, port));
    }

    /// Read one line with terminators stripped. An empty string signals
    /// stream end, a read failure, a disconnect racing the read, or an
    /// absent transport; it never raises. Undecodable bytes are replaced.
    pub async fn read(&self) -> String {
        let mut state = self.state.subscribe();
        tokio::select! {
            line = self.read_line() => line,
            _ = state.wait_for(|s| *s != ConnectionState::Connected) => String::new(),
        }
    }

    async fn read_line(&self) -> String {
        let mut reader = self.reader.lock().await;
        let Some(reader) = reader.as_mut() else {
            return String::new();
        };
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => String::new(),
            Ok(_) => String::from_utf8_lossy(&buf)
                .trim_end_matches(['\r', '\n'])
                .to_string(),
            Err(error) => {
                debug!(error = %error, "read failed, treating as stream end");
                String::new()
            }
        }
    }

    /// Encode and send one command. Encoding failures surface before
    /// anything is written; when not Connected the encoded line is dropped.
    pub async fn send(&self, command: &Command) -> Result<(), SendError> {
        let line = codec::pack_command(command)?;
        self.send_line(&line).await
    }

    /// Send a pre-formatted line. Trailing terminators are normalized to a
    /// single `\r\n`; embedded ones are rejected to keep the line-injection
    /// guard intact.
    pub async fn send_raw(&self, line: &str) -> Result<(), SendError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.contains('\r') || trimmed.contains('\n') {
            return Err(SendError::RawTerminator);
        }
        let mut wire = trimmed.to_string();
        wire.push_str("\r\n");
        self.send_line(&wire).await
    }

    async fn send_line(&self, line: &str) -> Result<(), SendError> {
        if !self.connected() {
            trace!(line = line.trim_end(), "dropping line while disconnected");
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        let Some(writer) = writer.as_mut() else {
            return Ok(());
        };
        trace!(line = line.trim_end(), "-->");
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(SendError::Write)?;
        writer.flush().await.map_err(SendError::Write)
    }

    /// Drive the connection: connect, then read, decode, and dispatch until
    /// the stream ends.
    ///
    /// An empty read tears the connection down; with the `reconnect` policy
    /// enabled each drop gets one best-effort reconnect and the loop
    /// resumes, otherwise `run` returns. Malformed lines are counted,
    /// logged, and skipped; they never terminate the loop.
    pub async fn run(&self) -> Result<(), ConnectError> {
        self.connect().await?;
        loop {
            let line = self.read().await;
            if line.is_empty() {
                self.disconnect().await;
                if !self.config.reconnect {
                    return Ok(());
                }
                debug!("attempting reconnect");
                self.connect().await?;
                continue;
            }
            trace!(line = %line, "<--");
            match codec::unpack_line(&line) {
                Ok(event) => {
                    self.events.trigger(&event);
                }
                Err(error) => {
                    self.events.diagnostics().record_decode_error();
                    warn!(line = %line, error = %error, "discarding unparseable line");
                }
            }
        }
    }
}
