//! Configuration data model.
//!
//! Derives `Serialize`/`Deserialize` for TOML persistence. Every field has
//! a default so a connection can be built out of the box.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Settings for one client connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_tls")]
    pub tls: bool,
    /// Skip TLS certificate verification (self-signed test servers).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Wire text encoding. Only the UTF-8 family is supported; undecodable
    /// bytes are replaced rather than failing the line.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Attempt a single reconnect each time the server drops the
    /// connection, instead of ending the run loop.
    #[serde(default)]
    pub reconnect: bool,
}

fn default_host() -> String {
    "irc.libera.chat".into()
}

fn default_port() -> u16 {
    6697
}

fn default_tls() -> bool {
    true
}

fn default_encoding() -> String {
    "utf-8".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: default_tls(),
            accept_invalid_certs: false,
            encoding: default_encoding(),
            reconnect: false,
        }
    }
}

impl ClientConfig {
    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            bail!("host must not be empty");
        }
        if self.port == 0 {
            bail!("port must not be zero");
        }
        match self.encoding.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "ascii" | "us-ascii" => Ok(()),
            other => bail!("unsupported encoding `{}`", other),
        }
    }
}
