//! services/admin/src/console/commands.rs
//!
//! The line commands understood by the console.

use student_admin_core::domain::RecordId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Page(usize),
    Next,
    Prev,
    Add,
    Edit(RecordId),
    Delete(RecordId),
    Retry,
    Classes,
    Chat(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Type a command, or 'help' for the list")]
    Empty,
    #[error("Unknown command '{0}'. Type 'help' for the list")]
    Unknown(String),
    #[error("'{0}' needs {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("'{0}' is not a page number")]
    InvalidPage(String),
}

pub const HELP: &str = "\
Commands:
  list            show the current page
  page <n>        go to page n
  next | prev     move one page
  add             create a student
  edit <id>       edit a student
  delete <id>     delete a student
  retry           reload after a failed load
  classes         show available classes
  chat <text>     ask the help assistant
  help            show this text
  quit            leave";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "" => return Err(CommandError::Empty),
        "list" | "ls" => Command::List,
        "page" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("page", "a page number"));
            }
            match rest.parse::<usize>() {
                Ok(page) if page >= 1 => Command::Page(page),
                _ => return Err(CommandError::InvalidPage(rest.to_string())),
            }
        }
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "add" | "new" => Command::Add,
        "edit" => Command::Edit(record_id("edit", rest)?),
        "delete" | "rm" => Command::Delete(record_id("delete", rest)?),
        "retry" => Command::Retry,
        "classes" => Command::Classes,
        "chat" | "ask" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("chat", "a message"));
            }
            Command::Chat(rest.to_string())
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn record_id(command: &'static str, raw: &str) -> Result<RecordId, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument(command, "a student id"));
    }
    raw.parse::<RecordId>()
        .map_err(|never| match never {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(parse("page 3"), Ok(Command::Page(3)));
        assert_eq!(parse("  EDIT   12 "), Ok(Command::Edit(RecordId::Int(12))));
        assert_eq!(parse("delete abc-1"), Ok(Command::Delete(RecordId::Text("abc-1".into()))));
        assert_eq!(parse("chat how do I add a student?"), Ok(Command::Chat("how do I add a student?".into())));
        assert_eq!(parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse("   "), Err(CommandError::Empty));
        assert_eq!(parse("page"), Err(CommandError::MissingArgument("page", "a page number")));
        assert_eq!(parse("page 0"), Err(CommandError::InvalidPage("0".into())));
        assert_eq!(parse("page two"), Err(CommandError::InvalidPage("two".into())));
        assert_eq!(parse("edit"), Err(CommandError::MissingArgument("edit", "a student id")));
        assert_eq!(parse("chat"), Err(CommandError::MissingArgument("chat", "a message")));
        assert_eq!(parse("frobnicate"), Err(CommandError::Unknown("frobnicate".into())));
    }
}
