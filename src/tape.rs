//! This module defines the `Tape` of a binary Turing machine: a window of bits that grows
//! by one blank cell whenever the head walks past either end.

use crate::types::{BeaverError, Direction};
use std::collections::VecDeque;
use std::fmt;

/// A conceptually unbounded bit tape.
///
/// Only the cells the head has visited are materialized. The head always lies inside the
/// window; every cell outside it reads as `0`.
///
/// The canonical `position` is the head's index within the window. `origin` records the
/// window index of the cell the head sat on when the tape was created, so `coordinate()`
/// can report the head's absolute offset from that cell.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: VecDeque<bool>,
    head: usize,
    origin: i64,
}

impl Tape {
    /// Creates a blank tape: a single `0` cell with the head on it.
    pub fn new() -> Self {
        Self {
            cells: VecDeque::from([false]),
            head: 0,
            origin: 0,
        }
    }

    /// Rebuilds a tape from its canonical bit string with the head at `position`.
    ///
    /// # Returns
    ///
    /// * `Ok(Tape)` when `bits` is a non-empty string of `0`/`1` and `position` lies within it.
    /// * `Err(BeaverError::ValidationError)` otherwise.
    pub fn from_bits(bits: &str, position: i64) -> Result<Self, BeaverError> {
        let cells = bits
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(BeaverError::ValidationError(format!(
                    "Invalid tape symbol '{}'",
                    c
                ))),
            })
            .collect::<Result<VecDeque<_>, _>>()?;

        if cells.is_empty() {
            return Err(BeaverError::ValidationError(
                "Tape must contain at least one cell".to_string(),
            ));
        }

        let head = usize::try_from(position)
            .ok()
            .filter(|&head| head < cells.len())
            .ok_or_else(|| {
                BeaverError::ValidationError(format!(
                    "Head position {} is outside the tape window of {} cells",
                    position,
                    cells.len()
                ))
            })?;

        Ok(Self {
            cells,
            head,
            origin: position,
        })
    }

    /// Returns the bit under the head.
    pub fn read(&self) -> bool {
        self.cells[self.head]
    }

    /// Writes `bit` under the head.
    pub fn write(&mut self, bit: bool) {
        self.cells[self.head] = bit;
    }

    /// Moves the head one cell, materializing a blank cell when it crosses a boundary.
    ///
    /// Prepending on the left keeps the head at index 0, so the position is unchanged.
    /// Appending on the right moves the head onto the new last cell.
    pub fn move_head(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.head == 0 {
                    self.cells.push_front(false);
                    self.origin += 1;
                } else {
                    self.head -= 1;
                }
            }
            Direction::Right => {
                if self.head + 1 == self.cells.len() {
                    self.cells.push_back(false);
                }
                self.head += 1;
            }
        }
    }

    /// Returns the head's index within the materialized window.
    pub fn position(&self) -> usize {
        self.head
    }

    /// Returns the head's coordinate relative to the cell it started on.
    pub fn coordinate(&self) -> i64 {
        self.head as i64 - self.origin
    }

    /// Returns the number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A tape always holds at least the cell under the head.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the materialized cells as a `0`/`1` string.
    pub fn bits(&self) -> String {
        self.cells.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
    }

    /// Returns the number of `1` cells on the tape.
    pub fn ones(&self) -> usize {
        self.cells.iter().filter(|&&bit| bit).count()
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

/// Two tapes are equal when their windows and head positions match; `origin` is not persisted.
impl PartialEq for Tape {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.cells == other.cells
    }
}

impl Eq for Tape {}

/// Formats the tape as `<position>\t<bits>`.
impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.head, self.bits())
    }
}
