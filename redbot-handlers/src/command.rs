//! Command grammar: `/name arg` with short aliases, tolerating a `@botname`
//! suffix on the command word.

/// One parsed bot command. Arguments are raw; validation happens in the
/// handler so invalid input gets a reply instead of being dropped here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/prediction [CODE]`, `/p [CODE]`
    Start { code: Option<&'a str> },
    /// `/stop_prediction`, `/s`
    Stop,
    /// `/default_code CODE`, `/dc CODE`
    DefaultCode { code: Option<&'a str> },
    /// `/default_interval SECONDS`, `/di SECONDS`
    DefaultInterval { value: Option<&'a str> },
    /// `/default_duration MINUTES`, `/dd MINUTES`
    DefaultDuration { value: Option<&'a str> },
    /// `/info`, `/i`
    Info,
    /// `/hello`
    Hello,
}

/// Parses a message text into a [`Command`]. Returns None for plain text and
/// unknown commands; both are ignored by the handler.
pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let name = head.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    let arg = parts.next();

    match name {
        "prediction" | "p" => Some(Command::Start { code: arg }),
        "stop_prediction" | "s" => Some(Command::Stop),
        "default_code" | "dc" => Some(Command::DefaultCode { code: arg }),
        "default_interval" | "di" => Some(Command::DefaultInterval { value: arg }),
        "default_duration" | "dd" => Some(Command::DefaultDuration { value: arg }),
        "info" | "i" => Some(Command::Info),
        "hello" => Some(Command::Hello),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_names_and_aliases() {
        assert_eq!(
            parse_command("/prediction PI445"),
            Some(Command::Start { code: Some("PI445") })
        );
        assert_eq!(parse_command("/p"), Some(Command::Start { code: None }));
        assert_eq!(parse_command("/stop_prediction"), Some(Command::Stop));
        assert_eq!(parse_command("/s"), Some(Command::Stop));
        assert_eq!(
            parse_command("/dc PA433"),
            Some(Command::DefaultCode { code: Some("PA433") })
        );
        assert_eq!(
            parse_command("/di 30"),
            Some(Command::DefaultInterval { value: Some("30") })
        );
        assert_eq!(
            parse_command("/dd 5"),
            Some(Command::DefaultDuration { value: Some("5") })
        );
        assert_eq!(parse_command("/info"), Some(Command::Info));
        assert_eq!(parse_command("/i"), Some(Command::Info));
        assert_eq!(parse_command("/hello"), Some(Command::Hello));
    }

    #[test]
    fn test_parse_command_strips_botname_suffix() {
        assert_eq!(
            parse_command("/prediction@red_predictions_bot PI445"),
            Some(Command::Start { code: Some("PI445") })
        );
        assert_eq!(parse_command("/s@red_predictions_bot"), Some(Command::Stop));
    }

    #[test]
    fn test_parse_command_ignores_non_commands() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command("p PI445"), None);
    }
}
