//! Event-name to named-field table.
//!
//! Mirrors the keyword-parameter convention of classic RFC2812 clients:
//! sender-derived fields (`nick`, `user`, `host`) first where the command
//! has a meaningful sender, then the wire parameters in order. Commands
//! without an entry decode positionally.

pub(crate) struct EventSchema {
    /// Expose `nick`/`user`/`host` parsed from the line's source prefix.
    pub(crate) source_fields: bool,
    /// Field names for the positional wire parameters, in order.
    pub(crate) params: &'static [&'static str],
}

pub(crate) fn lookup(name: &str) -> Option<&'static EventSchema> {
    const PING: EventSchema = EventSchema {
        source_fields: false,
        params: &["message"],
    };
    const PONG: EventSchema = EventSchema {
        source_fields: false,
        params: &["message"],
    };
    const PRIVMSG: EventSchema = EventSchema {
        source_fields: true,
        params: &["target", "message"],
    };
    const NOTICE: EventSchema = EventSchema {
        source_fields: true,
        params: &["target", "message"],
    };
    const JOIN: EventSchema = EventSchema {
        source_fields: true,
        params: &["channel"],
    };
    const PART: EventSchema = EventSchema {
        source_fields: true,
        params: &["channel", "message"],
    };
    const QUIT: EventSchema = EventSchema {
        source_fields: true,
        params: &["message"],
    };
    const NICK: EventSchema = EventSchema {
        source_fields: true,
        params: &["new_nick"],
    };
    const LIFECYCLE: EventSchema = EventSchema {
        source_fields: false,
        params: &["host", "port"],
    };

    match name {
        "PING" => Some(&PING),
        "PONG" => Some(&PONG),
        "PRIVMSG" => Some(&PRIVMSG),
        "NOTICE" => Some(&NOTICE),
        "JOIN" => Some(&JOIN),
        "PART" => Some(&PART),
        "QUIT" => Some(&QUIT),
        "NICK" => Some(&NICK),
        "CLIENT_CONNECT" | "CLIENT_DISCONNECT" => Some(&LIFECYCLE),
        _ => None,
    }
}

/// Map a source prefix and positional parameters onto the schema's field
/// names. Only present values produce fields; parameters past the schema
/// keep positional `paramN` names so nothing is dropped.
pub(crate) fn apply(
    schema: &EventSchema,
    source: Option<&str>,
    params: &[String],
) -> Vec<(String, String)> {
    let mut fields = Vec::with_capacity(params.len() + 3);

    if schema.source_fields {
        if let Some(source) = source {
            let (nick, user, host) = split_source(source);
            if !nick.is_empty() {
                fields.push(("nick".to_string(), nick.to_string()));
            }
            if !user.is_empty() {
                fields.push(("user".to_string(), user.to_string()));
            }
            if !host.is_empty() {
                fields.push(("host".to_string(), host.to_string()));
            }
        }
    }

    for (name, value) in schema.params.iter().zip(params) {
        fields.push(((*name).to_string(), value.clone()));
    }
    for (index, value) in params.iter().enumerate().skip(schema.params.len()) {
        fields.push((format!("param{index}"), value.clone()));
    }

    fields
}

/// Split `nick!user@host` into its parts; missing segments come back empty.
/// A bare server name lands in `nick`, matching the loose convention most
/// clients follow.
fn split_source(source: &str) -> (&str, &str, &str) {
    let (front, host) = match source.split_once('@') {
        Some((front, host)) => (front, host),
        None => (source, ""),
    };
    let (nick, user) = match front.split_once('!') {
        Some((nick, user)) => (nick, user),
        None => (front, ""),
    };
    (nick, user, host)
}
