//! Line-oriented commands typed at the terminal prompt.

use code_entry::{EntryCommand, InputEvent};
use thiserror::Error;

pub const HELP: &str = "commands: <digit> | type <cell> <digit> | back [cell] | paste <text> | submit | resend | quit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("nothing entered; {help}", help = HELP)]
    Empty,
    #[error("unknown command '{0}'; {help}", help = HELP)]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parses one line. `focus` is the cell the widget currently wants focused and
/// is used when the line does not name a cell.
pub fn parse_command(line: &str, focus: Option<usize>) -> Result<EntryCommand, PromptError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(PromptError::Empty);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let focus = focus.unwrap_or(0);

    let command = match word.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => EntryCommand::Close,
        "resend" | "r" => EntryCommand::Resend,
        "submit" | "s" => EntryCommand::Input(InputEvent::Submit),
        "paste" | "p" => {
            if rest.is_empty() {
                return Err(PromptError::Usage("paste <text>"));
            }
            EntryCommand::Input(InputEvent::Paste {
                text: rest.to_string(),
            })
        }
        "back" | "bs" => {
            let index = if rest.is_empty() {
                focus
            } else {
                parse_cell(rest, "back [cell]")?
            };
            EntryCommand::Input(InputEvent::Backspace { index })
        }
        "type" | "t" => {
            let (cell, value) = rest
                .split_once(char::is_whitespace)
                .ok_or(PromptError::Usage("type <cell> <digit>"))?;
            let mut chars = value.trim().chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(PromptError::Usage("type <cell> <digit>"));
            };
            EntryCommand::Input(InputEvent::Char {
                index: parse_cell(cell, "type <cell> <digit>")?,
                ch,
            })
        }
        _ => return parse_bare(line, focus),
    };

    Ok(command)
}

// A lone character goes into the focused cell; anything carrying digits is a
// paste.
fn parse_bare(line: &str, focus: usize) -> Result<EntryCommand, PromptError> {
    let mut chars = line.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(EntryCommand::Input(InputEvent::Char { index: focus, ch }));
    }

    if line.chars().any(|ch| ch.is_ascii_digit()) {
        return Ok(EntryCommand::Input(InputEvent::Paste {
            text: line.to_string(),
        }));
    }

    Err(PromptError::Unknown(line.to_string()))
}

fn parse_cell(raw: &str, usage: &'static str) -> Result<usize, PromptError> {
    raw.trim().parse().map_err(|_| PromptError::Usage(usage))
}

#[cfg(test)]
#[path = "tests/prompt_tests.rs"]
mod tests;
