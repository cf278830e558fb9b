//! Fixed-length digit cells.

use crate::error::EntryError;

pub const CODE_LENGTH: usize = 6;

/// Exactly [`CODE_LENGTH`] cells, each empty or holding one ASCII digit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    cells: [Option<char>; CODE_LENGTH],
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills leading cells from the digits of `raw`; everything else is dropped.
    pub fn from_digits(raw: &str) -> Self {
        let mut buffer = Self::new();
        buffer.overwrite_prefix(raw);
        buffer
    }

    /// Overwrites cells `0..n` with the first `n` digits of `raw`, leaving later
    /// cells untouched. Returns `n`.
    pub fn overwrite_prefix(&mut self, raw: &str) -> usize {
        let digits = digits_only(raw);
        for (cell, digit) in self.cells.iter_mut().zip(&digits) {
            *cell = Some(*digit);
        }
        digits.len()
    }

    pub fn set_cell(&mut self, index: usize, value: Option<char>) -> Result<(), EntryError> {
        if let Some(ch) = value {
            if !ch.is_ascii_digit() {
                return Err(EntryError::NotADigit { value: ch });
            }
        }

        let cell = self
            .cells
            .get_mut(index)
            .ok_or(EntryError::CellOutOfRange { index })?;
        *cell = value;
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.cells = [None; CODE_LENGTH];
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().flatten()
    }

    pub fn cells(&self) -> &[Option<char>; CODE_LENGTH] {
        &self.cells
    }

    pub fn filled_len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// The joined code, only when every cell is filled.
    pub fn code(&self) -> Option<String> {
        self.cells.iter().copied().collect()
    }
}

/// Digits of `raw` in order, truncated to [`CODE_LENGTH`].
pub fn digits_only(raw: &str) -> Vec<char> {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(CODE_LENGTH)
        .collect()
}

#[cfg(test)]
#[path = "tests/buffer_tests.rs"]
mod tests;
