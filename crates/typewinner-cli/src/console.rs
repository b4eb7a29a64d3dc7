//! Interactive console command grammar.

pub const HELP: &str = "\
commands:
  start              launch the game browser
  speed <min> <max>  set typing speed (0..=400, higher is faster)
  errors <percent>   set error-injection rate (0..=100)
  key [value]        save the recognition API key, or show its status
  open <url>         open a page in the system browser
  help               show this help
  quit               close the session and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Speed { min: u64, max: u64 },
    Errors { percent: u8 },
    Key { value: Option<String> },
    Open { url: String },
    Help,
    Quit,
}

/// Parse one console line. Blank lines parse to `None`; anything the
/// grammar rejects comes back as a message for the user.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();

    let command = match head {
        "start" => Command::Start,
        "speed" => match rest.as_slice() {
            [min, max] => Command::Speed {
                min: parse_number(min, "minimum speed")?,
                max: parse_number(max, "maximum speed")?,
            },
            _ => return Err("usage: speed <min> <max>".into()),
        },
        "errors" => match rest.as_slice() {
            [percent] => Command::Errors {
                percent: parse_number(percent, "error rate")?,
            },
            _ => return Err("usage: errors <percent>".into()),
        },
        "key" => match rest.as_slice() {
            [] => Command::Key { value: None },
            [value] => Command::Key {
                value: Some((*value).to_string()),
            },
            _ => return Err("usage: key [value]".into()),
        },
        "open" => match rest.as_slice() {
            [url] => Command::Open {
                url: (*url).to_string(),
            },
            _ => return Err("usage: open <url>".into()),
        },
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', type 'help'")),
    };
    Ok(Some(command))
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{what} must be a number, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_parse_to_nothing() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   \t ").unwrap(), None);
    }

    #[test]
    fn speed_takes_two_numbers() {
        assert_eq!(
            parse_command("speed 375 380").unwrap(),
            Some(Command::Speed { min: 375, max: 380 })
        );
        assert!(parse_command("speed 375").is_err());
        assert!(parse_command("speed fast faster").is_err());
    }

    #[test]
    fn errors_takes_one_percentage() {
        assert_eq!(
            parse_command("errors 70").unwrap(),
            Some(Command::Errors { percent: 70 })
        );
        assert!(parse_command("errors").is_err());
        // Values past u8 are rejected at parse time.
        assert!(parse_command("errors 300").is_err());
    }

    #[test]
    fn key_value_is_optional() {
        assert_eq!(
            parse_command("key").unwrap(),
            Some(Command::Key { value: None })
        );
        assert_eq!(
            parse_command("key gsk_abc").unwrap(),
            Some(Command::Key {
                value: Some("gsk_abc".into())
            })
        );
        assert!(parse_command("key one two").is_err());
    }

    #[test]
    fn open_requires_a_url() {
        assert_eq!(
            parse_command("open https://example.com").unwrap(),
            Some(Command::Open {
                url: "https://example.com".into()
            })
        );
        assert!(parse_command("open").is_err());
    }

    #[test]
    fn exit_is_an_alias_for_quit() {
        assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn unknown_commands_point_at_help() {
        let message = parse_command("launch").unwrap_err();
        assert!(message.contains("help"));
    }
}
