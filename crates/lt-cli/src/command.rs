//! Line-command grammar for the interactive session.
//!
//! A line longer than one character starting with `!` is a command;
//! any other line (including an empty one) is a new tag.

use thiserror::Error;

use lt_core::MAX_OFFSET_SECONDS;

const ADJUST_USAGE: &str = "!adjust seconds";
const ADJUST_BACK_USAGE: &str = "!adjust_back index_from_end seconds";
const EDIT_USAGE: &str = "!edit tag_text";
const EDIT_BACK_USAGE: &str = "!edit_back index_from_end tag_text";
const OFFSET_USAGE: &str = "!offset lower_bound offset_seconds (optional: upper_bound)";
const DELETE_BACK_USAGE: &str = "!delete_back index_from_end";
const YT_START_USAGE: &str = "!yt_start yt_url";

/// Command parse failures, reported verbatim to the operator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Arguments missing or malformed for a known command.
    #[error("Invalid argument(s). Format: {usage}")]
    Usage { usage: &'static str },
    /// The command word is not recognized.
    #[error("Invalid command")]
    Unknown,
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A new tag with the line as its text.
    Tag(String),
    /// A `!`-prefixed command.
    Command(Command),
}

/// Parsed session commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print all tags, then ask whether the session is finished.
    Flush,
    /// Ask whether the session is finished, warning about loaded tags.
    Quit,
    /// Time-shift the tag at `index` (counting back from the latest).
    Adjust { index: i64, delta: i64 },
    /// Replace the text of the tag at `index`.
    Edit { index: i64, text: String },
    /// Bulk-shift every tag in `[lower, upper)` by `delta` seconds.
    Offset { lower: i64, delta: i64, upper: i64 },
    /// Remove the tag at `index`.
    Delete { index: i64 },
    /// Correct the session start from a live stream's actual start.
    YtStart { url: String },
}

/// Classifies an input line as a tag or a command.
pub fn classify(line: &str) -> Result<Input, CommandError> {
    if line.len() > 1 && line.starts_with('!') {
        parse_command(&line[1..]).map(Input::Command)
    } else {
        Ok(Input::Tag(line.to_string()))
    }
}

/// Parses the command body (without the leading `!`).
///
/// The command word is case-insensitive; text arguments are taken
/// verbatim after the separating space, inner spacing preserved.
fn parse_command(body: &str) -> Result<Command, CommandError> {
    let (word, rest) = match body.split_once(' ') {
        Some((word, rest)) => (word, Some(rest)),
        None => (body, None),
    };
    match word.to_ascii_lowercase().as_str() {
        "flush" => Ok(Command::Flush),
        "quit" | "exit" => Ok(Command::Quit),
        "adjust" => {
            let delta = parse_int(rest).ok_or(usage(ADJUST_USAGE))?;
            Ok(Command::Adjust { index: 1, delta })
        }
        "adjust_back" => {
            let (index, delta) = parse_two_ints(rest).ok_or(usage(ADJUST_BACK_USAGE))?;
            Ok(Command::Adjust { index, delta })
        }
        "edit" => {
            let text = rest.filter(|text| !text.is_empty()).ok_or(usage(EDIT_USAGE))?;
            Ok(Command::Edit {
                index: 1,
                text: text.to_string(),
            })
        }
        "edit_back" => {
            let (index, text) = parse_index_and_text(rest).ok_or(usage(EDIT_BACK_USAGE))?;
            Ok(Command::Edit { index, text })
        }
        "offset" => parse_offset(rest).ok_or(usage(OFFSET_USAGE)),
        "delete" => Ok(Command::Delete { index: 1 }),
        "delete_back" => {
            let index = parse_int(rest).ok_or(usage(DELETE_BACK_USAGE))?;
            Ok(Command::Delete { index })
        }
        "yt_start" => {
            let url = rest
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .ok_or(usage(YT_START_USAGE))?;
            Ok(Command::YtStart {
                url: url.to_string(),
            })
        }
        _ => Err(CommandError::Unknown),
    }
}

const fn usage(usage: &'static str) -> CommandError {
    CommandError::Usage { usage }
}

fn parse_int(rest: Option<&str>) -> Option<i64> {
    rest?.trim().parse().ok()
}

fn parse_two_ints(rest: Option<&str>) -> Option<(i64, i64)> {
    let mut parts = rest?.split_whitespace();
    let first = parts.next()?.parse().ok()?;
    let second = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, second))
}

fn parse_index_and_text(rest: Option<&str>) -> Option<(i64, String)> {
    let (index, text) = rest?.split_once(' ')?;
    let index = index.parse().ok()?;
    if text.is_empty() {
        return None;
    }
    Some((index, text.to_string()))
}

fn parse_offset(rest: Option<&str>) -> Option<Command> {
    let mut parts = rest?.split_whitespace();
    let lower = parts.next()?.parse().ok()?;
    let delta = parts.next()?.parse().ok()?;
    let upper = match parts.next() {
        Some(token) => token.parse().ok()?,
        None => MAX_OFFSET_SECONDS,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Command::Offset {
        lower,
        delta,
        upper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match classify(line).unwrap() {
            Input::Command(command) => command,
            Input::Tag(text) => panic!("expected command, got tag {text:?}"),
        }
    }

    #[test]
    fn plain_lines_are_tags() {
        assert_eq!(
            classify("fielder makes a diving catch").unwrap(),
            Input::Tag("fielder makes a diving catch".to_string())
        );
        assert_eq!(classify("").unwrap(), Input::Tag(String::new()));
        // A lone bang is too short to be a command.
        assert_eq!(classify("!").unwrap(), Input::Tag("!".to_string()));
    }

    #[test]
    fn command_word_is_case_insensitive() {
        assert_eq!(command("!FLUSH"), Command::Flush);
        assert_eq!(command("!Quit"), Command::Quit);
        assert_eq!(command("!exit"), Command::Quit);
    }

    #[test]
    fn adjust_defaults_to_latest_tag() {
        assert_eq!(
            command("!adjust -15"),
            Command::Adjust {
                index: 1,
                delta: -15
            }
        );
    }

    #[test]
    fn adjust_back_takes_index_and_seconds() {
        assert_eq!(
            command("!adjust_back 3 10"),
            Command::Adjust { index: 3, delta: 10 }
        );
    }

    #[test]
    fn adjust_rejects_missing_or_malformed_seconds() {
        assert_eq!(
            classify("!adjust").unwrap_err(),
            CommandError::Usage {
                usage: "!adjust seconds"
            }
        );
        assert!(classify("!adjust ten").is_err());
        assert!(classify("!adjust_back 1").is_err());
        assert!(classify("!adjust_back 1 2 3").is_err());
    }

    #[test]
    fn edit_keeps_text_verbatim() {
        assert_eq!(
            command("!edit two  inner   spaces"),
            Command::Edit {
                index: 1,
                text: "two  inner   spaces".to_string()
            }
        );
    }

    #[test]
    fn edit_back_splits_index_from_text() {
        assert_eq!(
            command("!edit_back 2 home run to left field"),
            Command::Edit {
                index: 2,
                text: "home run to left field".to_string()
            }
        );
    }

    #[test]
    fn edit_rejects_empty_text() {
        assert!(classify("!edit").is_err());
        assert!(classify("!edit_back 2").is_err());
        assert!(classify("!edit_back two text").is_err());
    }

    #[test]
    fn offset_upper_bound_defaults_to_end_of_day() {
        assert_eq!(
            command("!offset 300 -5"),
            Command::Offset {
                lower: 300,
                delta: -5,
                upper: MAX_OFFSET_SECONDS
            }
        );
        assert_eq!(
            command("!offset 300 -5 600"),
            Command::Offset {
                lower: 300,
                delta: -5,
                upper: 600
            }
        );
    }

    #[test]
    fn offset_rejects_wrong_arity() {
        assert!(classify("!offset").is_err());
        assert!(classify("!offset 300").is_err());
        assert!(classify("!offset 300 -5 600 900").is_err());
    }

    #[test]
    fn delete_variants() {
        assert_eq!(command("!delete"), Command::Delete { index: 1 });
        assert_eq!(command("!delete_back 4"), Command::Delete { index: 4 });
        assert!(classify("!delete_back four").is_err());
    }

    #[test]
    fn yt_start_takes_url() {
        assert_eq!(
            command("!yt_start https://youtu.be/dQw4w9WgXcQ"),
            Command::YtStart {
                url: "https://youtu.be/dQw4w9WgXcQ".to_string()
            }
        );
        assert!(classify("!yt_start").is_err());
        assert!(classify("!yt_start   ").is_err());
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert_eq!(classify("!bogus").unwrap_err(), CommandError::Unknown);
        assert_eq!(classify("!adjustall 5").unwrap_err(), CommandError::Unknown);
    }
}
