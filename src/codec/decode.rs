//! Wire-line to event decoding.

use super::{schema, DecodeError};
use crate::event::{Event, Fields};

/// Decode one received line, terminators already stripped.
///
/// An optional leading `:source` token is captured as the event source. The
/// next token is the command, uppercased into the event name. A parameter
/// starting with `:` begins the trailing parameter, which consumes the rest
/// of the line verbatim. Unknown commands decode under their own name with
/// positional fields; decoding only fails for lines with no command token.
pub fn unpack_line(line: &str) -> Result<Event, DecodeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut rest = line.trim_start_matches(' ');
    let mut source = None;
    if let Some(prefixed) = rest.strip_prefix(':') {
        let (token, tail) = prefixed.split_once(' ').ok_or(DecodeError::MissingCommand)?;
        if token.is_empty() {
            return Err(DecodeError::MissingCommand);
        }
        source = Some(token.to_string());
        rest = tail.trim_start_matches(' ');
    }

    let (command, tail) = match rest.split_once(' ') {
        Some((command, tail)) => (command, tail),
        None => (rest, ""),
    };
    if command.is_empty() {
        return Err(DecodeError::MissingCommand);
    }
    let name = command.to_uppercase();

    let mut params = Vec::new();
    let mut rest = tail.trim_start_matches(' ');
    while !rest.is_empty() {
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing.to_string());
            break;
        }
        match rest.split_once(' ') {
            Some((token, tail)) => {
                params.push(token.to_string());
                rest = tail.trim_start_matches(' ');
            }
            None => {
                params.push(rest.to_string());
                break;
            }
        }
    }

    let fields = match schema::lookup(&name) {
        Some(entry) => Fields::Named(schema::apply(entry, source.as_deref(), &params)),
        None => Fields::Positional(params),
    };

    Ok(Event {
        name,
        source,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{pack_command, Command, DecodeError};

    #[test]
    fn test_unpack_ping_with_trailing() {
        let event = unpack_line("PING :server1").unwrap();
        assert_eq!(event.name, "PING");
        assert_eq!(event.get("message"), Some("server1"));
        assert_eq!(event.source, None);
    }

    #[test]
    fn test_unpack_normalizes_command_case() {
        let event = unpack_line("ping server1").unwrap();
        assert_eq!(event.name, "PING");
        assert_eq!(event.get("message"), Some("server1"));
    }

    #[test]
    fn test_unpack_with_user_source() {
        let event = unpack_line(":dan!d@localhost PRIVMSG #chan :Hey what's up!").unwrap();
        assert_eq!(event.name, "PRIVMSG");
        assert_eq!(event.source.as_deref(), Some("dan!d@localhost"));
        assert_eq!(event.get("nick"), Some("dan"));
        assert_eq!(event.get("user"), Some("d"));
        assert_eq!(event.get("host"), Some("localhost"));
        assert_eq!(event.get("target"), Some("#chan"));
        assert_eq!(event.get("message"), Some("Hey what's up!"));
    }

    #[test]
    fn test_unpack_with_server_source() {
        let event = unpack_line(":irc.example.net PONG :token").unwrap();
        assert_eq!(event.name, "PONG");
        assert_eq!(event.source.as_deref(), Some("irc.example.net"));
        assert_eq!(event.get("message"), Some("token"));
    }

    #[test]
    fn test_unpack_join() {
        let event = unpack_line(":dan!d@host JOIN #rust").unwrap();
        assert_eq!(event.get("nick"), Some("dan"));
        assert_eq!(event.get("channel"), Some("#rust"));
    }

    #[test]
    fn test_unpack_unknown_command_is_positional() {
        let event = unpack_line("FOO a b :c d").unwrap();
        assert_eq!(event.name, "FOO");
        assert_eq!(
            event.fields,
            Fields::Positional(vec!["a".into(), "b".into(), "c d".into()])
        );
    }

    #[test]
    fn test_unpack_numeric_reply_is_positional() {
        let event = unpack_line(":irc.example.net 001 nick :Welcome").unwrap();
        assert_eq!(event.name, "001");
        assert_eq!(event.get("param0"), Some("nick"));
        assert_eq!(event.get("param1"), Some("Welcome"));
    }

    #[test]
    fn test_unpack_collapses_repeated_spaces() {
        let event = unpack_line("PING   server1").unwrap();
        assert_eq!(event.get("message"), Some("server1"));
    }

    #[test]
    fn test_unpack_empty_line_fails() {
        assert_eq!(unpack_line(""), Err(DecodeError::Empty));
        assert_eq!(unpack_line("   "), Err(DecodeError::Empty));
    }

    #[test]
    fn test_unpack_source_without_command_fails() {
        assert_eq!(unpack_line(":prefix"), Err(DecodeError::MissingCommand));
        assert_eq!(unpack_line(":"), Err(DecodeError::MissingCommand));
    }

    #[test]
    fn test_round_trip_reconstructs_values() {
        let commands = [
            Command::new("privmsg")
                .arg("target", "#test")
                .arg("message", "hi there"),
            Command::new("ping").arg("message", "server1"),
            Command::new("join").arg("channel", "#rust"),
            Command::new("topic").arg("channel", "#rust").arg("text", ""),
            Command::new("notice")
                .arg("target", "dan")
                .arg("message", ":starts with colon"),
            Command::new("quit"),
        ];
        for command in commands {
            let line = pack_command(&command).unwrap();
            let event = unpack_line(line.trim_end_matches(['\r', '\n'])).unwrap();
            assert_eq!(event.name, command.name().to_uppercase());
            let sent: Vec<&str> = command.args().iter().map(|(_, v)| v.as_str()).collect();
            let received: Vec<&str> = event.fields.values().collect();
            assert_eq!(received, sent, "round trip of {}", command.name());
        }
    }
}
