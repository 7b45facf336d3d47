//! Command definitions
//!
//! Defines every text command and the parsing of one command line

use thiserror::Error;

/// Errors that can occur while parsing a command line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unterminated quote in command")]
    UnterminatedQuote,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Expected '{expected}' but found '{found}'")]
    Expected { expected: &'static str, found: String },

    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Repeat count must be a positive number, got '{0}'")]
    InvalidCount(String),

    #[error("Unexpected argument: {0}")]
    Unexpected(String),
}

/// How a recurring event stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatEnd {
    Times(u32),
    Until(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub weekdays: String,
    pub end: RepeatEnd,
}

/// Arguments of `create event`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    pub repeat: Option<Repeat>,
    pub description: String,
    pub location: String,
    pub private: bool,
}

/// All commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateCalendar {
        name: String,
        timezone: String,
    },
    UseCalendar {
        name: String,
    },
    EditCalendar {
        name: String,
        property: String,
        value: String,
    },
    ShowCalendars,
    CreateEvent(NewEvent),
    EditEvent {
        property: String,
        name: String,
        start: String,
        end: String,
        value: String,
    },
    CopyEvent {
        name: String,
        start: String,
        target: String,
        target_start: String,
    },
    PrintEvents {
        date: String,
    },
    Busy {
        date: String,
    },
    Export {
        path: String,
    },
    Import {
        path: String,
    },
    Help,
    Exit,
}

/// Usage text shown by `help`
pub const USAGE: &str = "Commands:
  create calendar <name> <timezone>
  use calendar <name>
  edit calendar <name> <name|timezone> <value>
  show calendars
  create event <name> from <yyyy-MM-ddTHH:mm> to <yyyy-MM-ddTHH:mm> [repeats <days> for <n> times | repeats <days> until <yyyy-MM-ddTHH:mm>] [--description <text>] [--location <text>] [--private] [--allday]
  create event <name> on <yyyy-MM-dd> [repeats <days> for <n> times | repeats <days> until <yyyy-MM-dd>] [options]
  edit event <property> <name> from <yyyy-MM-ddTHH:mm> to <yyyy-MM-ddTHH:mm> with <value>
  copy event <name> on <yyyy-MM-ddTHH:mm> --target <calendar> to <yyyy-MM-ddTHH:mm>
  print events on <yyyy-MM-dd>
  busy on <yyyy-MM-dd>
  export cal <file.csv>
  import cal <file.csv>
  help
  exit

Weekdays: M T W R F S U (Monday to Sunday). Arguments with spaces go in double quotes.";

/// Parse one command line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = Tokens::new(tokenize(trimmed)?);
    let verb = tokens.word("command")?.to_ascii_lowercase();

    let command = match verb.as_str() {
        "create" => match tokens.word("'calendar' or 'event'")?.to_ascii_lowercase().as_str() {
            "calendar" => Command::CreateCalendar {
                name: tokens.word("calendar name")?,
                timezone: tokens.word("timezone")?,
            },
            "event" => Command::CreateEvent(parse_new_event(&mut tokens)?),
            other => return Err(CommandError::Unknown(format!("create {other}"))),
        },
        "use" => {
            tokens.keyword("calendar")?;
            Command::UseCalendar {
                name: tokens.word("calendar name")?,
            }
        }
        "edit" => match tokens.word("'calendar' or 'event'")?.to_ascii_lowercase().as_str() {
            "calendar" => Command::EditCalendar {
                name: tokens.word("calendar name")?,
                property: tokens.word("property")?,
                value: tokens.word("value")?,
            },
            "event" => {
                let property = tokens.word("property")?;
                let name = tokens.word("event name")?;
                tokens.keyword("from")?;
                let start = tokens.word("start")?;
                tokens.keyword("to")?;
                let end = tokens.word("end")?;
                tokens.keyword("with")?;
                Command::EditEvent {
                    property,
                    name,
                    start,
                    end,
                    value: tokens.word("new value")?,
                }
            }
            other => return Err(CommandError::Unknown(format!("edit {other}"))),
        },
        "show" => {
            tokens.keyword("calendars")?;
            Command::ShowCalendars
        }
        "copy" => {
            tokens.keyword("event")?;
            let name = tokens.word("event name")?;
            tokens.keyword("on")?;
            let start = tokens.word("source start")?;
            tokens.keyword("--target")?;
            let target = tokens.word("target calendar")?;
            tokens.keyword("to")?;
            Command::CopyEvent {
                name,
                start,
                target,
                target_start: tokens.word("target start")?,
            }
        }
        "print" => {
            tokens.keyword("events")?;
            tokens.keyword("on")?;
            Command::PrintEvents {
                date: tokens.word("date")?,
            }
        }
        "busy" => {
            tokens.keyword("on")?;
            Command::Busy {
                date: tokens.word("date")?,
            }
        }
        "export" => {
            tokens.keyword("cal")?;
            Command::Export {
                path: tokens.word("file name")?,
            }
        }
        "import" => {
            tokens.keyword("cal")?;
            Command::Import {
                path: tokens.word("file name")?,
            }
        }
        "help" => Command::Help,
        "exit" => Command::Exit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    tokens.finish()?;
    Ok(Some(command))
}

fn parse_new_event(tokens: &mut Tokens) -> Result<NewEvent, CommandError> {
    let name = tokens.word("event name")?;

    let form = tokens.word("'from' or 'on'")?.to_ascii_lowercase();
    let (start, end, all_day) = match form.as_str() {
        "from" => {
            let start = tokens.word("start")?;
            tokens.keyword("to")?;
            (start, tokens.word("end")?, false)
        }
        "on" => {
            let date = tokens.word("date")?;
            (format!("{date}T00:00"), format!("{date}T23:59"), true)
        }
        _ => {
            return Err(CommandError::Expected {
                expected: "from",
                found: form,
            });
        }
    };

    let mut event = NewEvent {
        name,
        start,
        end,
        all_day,
        repeat: None,
        description: String::new(),
        location: String::new(),
        private: false,
    };

    if tokens.peek_is("repeats") {
        tokens.keyword("repeats")?;
        let weekdays = tokens.word("weekdays")?;
        let end = match tokens.word("'for' or 'until'")?.to_ascii_lowercase().as_str() {
            "for" => {
                let count = tokens.word("repeat count")?;
                let times = count
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(CommandError::InvalidCount(count))?;
                tokens.keyword("times")?;
                RepeatEnd::Times(times)
            }
            "until" => {
                let until = tokens.word("until")?;
                if all_day && !until.contains('T') {
                    RepeatEnd::Until(format!("{until}T23:59"))
                } else {
                    RepeatEnd::Until(until)
                }
            }
            other => {
                return Err(CommandError::Expected {
                    expected: "for",
                    found: other.to_string(),
                });
            }
        };
        event.repeat = Some(Repeat { weekdays, end });
    }

    while let Some(option) = tokens.pop() {
        match option.to_ascii_lowercase().as_str() {
            "--description" => event.description = tokens.word("description")?,
            "--location" => event.location = tokens.word("location")?,
            "--private" => event.private = true,
            "--allday" => event.all_day = true,
            _ => return Err(CommandError::Unexpected(option)),
        }
    }

    Ok(event)
}

/// Split a line on whitespace, keeping double-quoted runs together
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }

    if in_quotes {
        return Err(CommandError::UnterminatedQuote);
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }

    Ok(tokens)
}

struct Tokens {
    items: std::vec::IntoIter<String>,
    peeked: Option<String>,
}

impl Tokens {
    fn new(items: Vec<String>) -> Self {
        Self {
            items: items.into_iter(),
            peeked: None,
        }
    }

    fn pop(&mut self) -> Option<String> {
        self.peeked.take().or_else(|| self.items.next())
    }

    fn peek_is(&mut self, keyword: &str) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.items.next();
        }
        self.peeked
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }

    fn word(&mut self, what: &'static str) -> Result<String, CommandError> {
        self.pop().ok_or(CommandError::Missing(what))
    }

    fn keyword(&mut self, expected: &'static str) -> Result<(), CommandError> {
        match self.pop() {
            Some(token) if token.eq_ignore_ascii_case(expected) => Ok(()),
            Some(found) => Err(CommandError::Expected { expected, found }),
            None => Err(CommandError::Missing(expected)),
        }
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.pop() {
            Some(extra) => Err(CommandError::Unexpected(extra)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).expect("should parse").expect("not blank")
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"create calendar "Work stuff" Europe/Paris"#).unwrap(),
            vec!["create", "calendar", "Work stuff", "Europe/Paris"]
        );
        assert_eq!(tokenize(r#"a "" b"#).unwrap(), vec!["a", "", "b"]);
        assert_eq!(tokenize(r#"open "quote"#), Err(CommandError::UnterminatedQuote));
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("# setup"), Ok(None));
    }

    #[test]
    fn test_parse_timed_event_with_options() {
        let command = parse(
            r#"create event "Team sync" from 2024-03-04T10:00 to 2024-03-04T10:30 --location "Room 4" --private"#,
        );
        assert_eq!(
            command,
            Command::CreateEvent(NewEvent {
                name: "Team sync".to_string(),
                start: "2024-03-04T10:00".to_string(),
                end: "2024-03-04T10:30".to_string(),
                all_day: false,
                repeat: None,
                description: String::new(),
                location: "Room 4".to_string(),
                private: true,
            })
        );
    }

    #[test]
    fn test_parse_recurring_forms() {
        let Command::CreateEvent(event) =
            parse("create event Class from 2024-01-01T10:00 to 2024-01-01T11:00 repeats MW for 3 times")
        else {
            panic!("expected create event");
        };
        assert_eq!(
            event.repeat,
            Some(Repeat {
                weekdays: "MW".to_string(),
                end: RepeatEnd::Times(3),
            })
        );

        let Command::CreateEvent(event) = parse("create event Holiday on 2024-12-23 repeats MTWRF until 2024-12-27")
        else {
            panic!("expected create event");
        };
        assert!(event.all_day);
        assert_eq!(event.start, "2024-12-23T00:00");
        assert_eq!(
            event.repeat.unwrap().end,
            RepeatEnd::Until("2024-12-27T23:59".to_string())
        );
    }

    #[test]
    fn test_parse_edit_and_copy() {
        assert_eq!(
            parse("edit event location Dentist from 2024-05-01T09:00 to 2024-05-01T10:00 with Clinic"),
            Command::EditEvent {
                property: "location".to_string(),
                name: "Dentist".to_string(),
                start: "2024-05-01T09:00".to_string(),
                end: "2024-05-01T10:00".to_string(),
                value: "Clinic".to_string(),
            }
        );
        assert_eq!(
            parse(r#"copy event Standup on 2024-05-31T09:00 --target "London office" to 2024-06-01T14:00"#),
            Command::CopyEvent {
                name: "Standup".to_string(),
                start: "2024-05-31T09:00".to_string(),
                target: "London office".to_string(),
                target_start: "2024-06-01T14:00".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_command("launch rockets"),
            Err(CommandError::Unknown("launch".to_string()))
        );
        assert_eq!(
            parse_command("print events at 2024-01-01"),
            Err(CommandError::Expected {
                expected: "on",
                found: "at".to_string()
            })
        );
        assert_eq!(
            parse_command("busy on"),
            Err(CommandError::Missing("date"))
        );
        assert_eq!(
            parse_command("create event X from 2024-01-01T10:00 to 2024-01-01T11:00 repeats M for 0 times"),
            Err(CommandError::InvalidCount("0".to_string()))
        );
        assert_eq!(
            parse_command("show calendars now"),
            Err(CommandError::Unexpected("now".to_string()))
        );
    }
}
