//! Protocol events delivered to registered handlers.
//!
//! An [`Event`] is either decoded from one received wire line or synthesized
//! by the connection itself for lifecycle notifications. Field values keep
//! wire order; commands the schema knows carry named fields, everything else
//! falls back to positional fields.

/// Name of the synthetic event fired after the transport is established.
pub const CLIENT_CONNECT: &str = "CLIENT_CONNECT";

/// Name of the synthetic event fired after the transport is torn down.
pub const CLIENT_DISCONNECT: &str = "CLIENT_DISCONNECT";

/// Parameters attached to an [`Event`], in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    /// Ordered `(field, value)` pairs for schema-known events.
    Named(Vec<(String, String)>),
    /// Raw parameters for commands without a schema entry.
    Positional(Vec<String>),
}

impl Fields {
    /// Look up a value by field name. Positional fields answer to
    /// `param0`, `param1`, ...
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            Fields::Named(pairs) => pairs
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.as_str()),
            Fields::Positional(values) => {
                let index: usize = name.strip_prefix("param")?.parse().ok()?;
                values.get(index).map(String::as_str)
            }
        }
    }

    /// Field values in wire order, regardless of representation.
    pub fn values(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Fields::Named(pairs) => Box::new(pairs.iter().map(|(_, value)| value.as_str())),
            Fields::Positional(values) => Box::new(values.iter().map(String::as_str)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Fields::Named(pairs) => pairs.len(),
            Fields::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One protocol event: a decoded wire line or a synthetic lifecycle
/// notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Uppercased command, or one of the synthetic event names.
    pub name: String,
    /// Wire prefix of the sender without the leading `:`, when present.
    pub source: Option<String>,
    pub fields: Fields,
}

impl Event {
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into().to_uppercase(),
            source: None,
            fields,
        }
    }

    /// Shorthand for [`Fields::get`].
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    pub fn client_connect(host: &str, port: u16) -> Self {
        Self::lifecycle(CLIENT_CONNECT, host, port)
    }

    pub fn client_disconnect(host: &str, port: u16) -> Self {
        Self::lifecycle(CLIENT_DISCONNECT, host, port)
    }

    fn lifecycle(name: &str, host: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            fields: Fields::Named(vec![
                ("host".to_string(), host.to_string()),
                ("port".to_string(), port.to_string()),
            ]),
        }
    }
}
