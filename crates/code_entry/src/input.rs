//! Turns raw key and paste events into cell mutations and focus requests.

use tracing::debug;

use crate::{
    buffer::{digits_only, CodeBuffer, CODE_LENGTH},
    error::EntryError,
};

const LAST_CELL: usize = CODE_LENGTH - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A single character typed into the cell at `index`.
    Char { index: usize, ch: char },
    /// Backspace pressed while the cell at `index` had focus.
    Backspace { index: usize },
    Paste { text: String },
    /// Explicit submit action, e.g. a button.
    Submit,
}

/// What an event did to the buffer and what should happen next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpretation {
    /// The buffer was mutated; a displayed failure should be dismissed.
    pub edited: bool,
    /// Requested focus index. `None` leaves focus where it is.
    pub focus: Option<usize>,
    /// A complete code to hand to the verification sequencer.
    pub submission: Option<String>,
    /// Submission came from the explicit submit action.
    pub manual: bool,
}

pub fn interpret(buffer: &mut CodeBuffer, event: &InputEvent) -> Result<Interpretation, EntryError> {
    match event {
        InputEvent::Char { index, ch } => enter_char(buffer, *index, *ch),
        InputEvent::Backspace { index } => backspace(buffer, *index),
        InputEvent::Paste { text } => Ok(paste(buffer, text)),
        InputEvent::Submit => submit(buffer),
    }
}

fn enter_char(buffer: &mut CodeBuffer, index: usize, ch: char) -> Result<Interpretation, EntryError> {
    buffer.set_cell(index, Some(ch))?;

    let submission = if index == LAST_CELL {
        buffer.code()
    } else {
        None
    };

    Ok(Interpretation {
        edited: true,
        focus: Some((index + 1).min(LAST_CELL)),
        submission,
        manual: false,
    })
}

// Clears the cell that had focus at keypress time, then steps back if that
// cell was already empty.
fn backspace(buffer: &mut CodeBuffer, index: usize) -> Result<Interpretation, EntryError> {
    if index >= CODE_LENGTH {
        return Err(EntryError::CellOutOfRange { index });
    }

    let was_empty = buffer.get(index).is_none();
    buffer.set_cell(index, None)?;

    let focus = if was_empty && index > 0 {
        index - 1
    } else {
        index
    };

    Ok(Interpretation {
        edited: true,
        focus: Some(focus),
        submission: None,
        manual: false,
    })
}

fn paste(buffer: &mut CodeBuffer, text: &str) -> Interpretation {
    if digits_only(text).is_empty() {
        debug!("paste carried no digits");
        return Interpretation {
            focus: Some(0),
            ..Interpretation::default()
        };
    }

    let written = buffer.overwrite_prefix(text);
    let submission = if written == CODE_LENGTH {
        buffer.code()
    } else {
        None
    };

    Interpretation {
        edited: true,
        focus: Some(written.min(LAST_CELL)),
        submission,
        manual: false,
    }
}

fn submit(buffer: &CodeBuffer) -> Result<Interpretation, EntryError> {
    let code = buffer.code().ok_or(EntryError::Incomplete)?;
    Ok(Interpretation {
        edited: false,
        focus: None,
        submission: Some(code),
        manual: true,
    })
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
