//! Command-to-wire-line encoding.

use super::{Command, EncodeError, LINE_TERMINATOR, MAX_LINE_LEN};

/// Encode a command as one wire line, `\r\n` included.
///
/// The command name is uppercased on the wire. The final argument is emitted
/// as the `:`-prefixed trailing parameter when it contains a space, is empty,
/// or itself starts with `:`; an earlier argument with any of those
/// properties cannot be represented in the grammar and fails the encode.
/// Embedded line terminators fail the encode in any position.
pub fn pack_command(command: &Command) -> Result<String, EncodeError> {
    let name = command.name();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(EncodeError::BadCommandName(name.to_string()));
    }

    let mut line = name.to_uppercase();
    let args = command.args();
    for (position, (arg, value)) in args.iter().enumerate() {
        if value.contains('\r') || value.contains('\n') {
            return Err(EncodeError::EmbeddedTerminator(arg.clone()));
        }
        let trailing = value.is_empty() || value.starts_with(':') || value.contains(' ');
        if trailing && position + 1 != args.len() {
            return Err(EncodeError::UnrepresentableArg(arg.clone()));
        }
        line.push(' ');
        if trailing {
            line.push(':');
        }
        line.push_str(value);
    }

    line.push_str(LINE_TERMINATOR);
    if line.len() > MAX_LINE_LEN {
        return Err(EncodeError::LineTooLong(line.len()));
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_privmsg_with_trailing() {
        let command = Command::new("privmsg")
            .arg("target", "#test")
            .arg("message", "hi there");
        assert_eq!(pack_command(&command).unwrap(), "PRIVMSG #test :hi there\r\n");
    }

    #[test]
    fn test_pack_single_token_last_arg() {
        let command = Command::new("ping").arg("message", "server1");
        assert_eq!(pack_command(&command).unwrap(), "PING server1\r\n");
    }

    #[test]
    fn test_pack_bare_command() {
        assert_eq!(pack_command(&Command::new("quit")).unwrap(), "QUIT\r\n");
    }

    #[test]
    fn test_pack_uppercases_name() {
        let command = Command::new("jOiN").arg("channel", "#rust");
        assert_eq!(pack_command(&command).unwrap(), "JOIN #rust\r\n");
    }

    #[test]
    fn test_pack_empty_trailing_gets_colon() {
        let command = Command::new("topic").arg("channel", "#rust").arg("text", "");
        assert_eq!(pack_command(&command).unwrap(), "TOPIC #rust :\r\n");
    }

    #[test]
    fn test_pack_middle_space_rejected() {
        let command = Command::new("privmsg")
            .arg("target", "#a room")
            .arg("message", "hi");
        assert_eq!(
            pack_command(&command),
            Err(EncodeError::UnrepresentableArg("target".into()))
        );
    }

    #[test]
    fn test_pack_embedded_terminator_rejected() {
        let command = Command::new("privmsg")
            .arg("target", "#test")
            .arg("message", "hi\r\nQUIT");
        assert_eq!(
            pack_command(&command),
            Err(EncodeError::EmbeddedTerminator("message".into()))
        );
    }

    #[test]
    fn test_pack_rejects_overlong_line() {
        let command = Command::new("privmsg")
            .arg("target", "#test")
            .arg("message", "x".repeat(600));
        assert!(matches!(
            pack_command(&command),
            Err(EncodeError::LineTooLong(_))
        ));
    }

    #[test]
    fn test_pack_rejects_bad_name() {
        assert_eq!(
            pack_command(&Command::new("")),
            Err(EncodeError::BadCommandName(String::new()))
        );
        assert!(matches!(
            pack_command(&Command::new("PRIV MSG")),
            Err(EncodeError::BadCommandName(_))
        ));
    }
}
