//! This module defines the core data structures and types used throughout the enumeration
//! pipeline, including machine descriptors, transitions, execution results, and error types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::Rule;

/// The number of machines persisted together in one checkpoint file.
pub const BATCH_SIZE: usize = 10;
/// The default number of ticks each machine is advanced by per checkpoint cycle.
pub const TICKS_PER_PASS: u64 = 10;
/// The halting sentinel state. A machine in this state never changes again.
pub const HALT_STATE: u32 = 0;
/// The state every freshly enumerated machine starts in.
pub const INITIAL_STATE: u32 = 1;

/// Represents the possible directions the head of a binary Turing machine can move.
///
/// Directions are persisted as base-2 digits: `0` is left, `1` is right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
}

impl Direction {
    /// Maps a persisted bit onto a direction.
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    /// Returns the bit this direction is persisted as.
    pub fn as_bit(self) -> bool {
        matches!(self, Direction::Right)
    }
}

/// A single entry of the transition table: what to do after reading a bit in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to. `0` halts the machine.
    pub next_state: u32,
    /// The bit written under the head.
    pub write: bool,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

/// Describes a machine independently of its runtime configuration.
///
/// Only states `1..num_states` carry transitions; state `0` halts. The table holds
/// `2 * (num_states - 1)` entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineDescriptor {
    /// The number of states, including the halting state.
    pub num_states: u32,
    /// The transition table, in enumeration order.
    pub transitions: Vec<Transition>,
}

impl MachineDescriptor {
    /// Returns the number of transition entries a machine with `num_states` states carries.
    pub fn table_len(num_states: u32) -> usize {
        2 * (num_states.saturating_sub(1) as usize)
    }

    /// Returns the table offset consulted when the machine reads `bit` in `state`.
    ///
    /// The offset is `(bit ? 2 : 1) * (state - 1)`. The halting state has no offset.
    fn transition_index(state: u32, bit: bool) -> Option<usize> {
        let factor = if bit { 2 } else { 1 };
        state.checked_sub(1).map(|row| factor * row as usize)
    }

    /// Looks up the transition for `state` reading `bit`.
    ///
    /// Returns `None` for the halting state or when the offset falls outside the table.
    pub fn transition(&self, state: u32, bit: bool) -> Option<&Transition> {
        self.transitions.get(Self::transition_index(state, bit)?)
    }
}

/// Represents the outcome of a single machine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a tick and can continue.
    Continue,
    /// The machine is in the halting state.
    Halt,
    /// The tick counter reached `u64::MAX`; the machine is left as it is.
    Exhausted,
}

/// Represents the errors that can occur while decoding, validating, or persisting machines.
#[derive(Debug, Error)]
pub enum BeaverError {
    /// A machine line does not follow the canonical grammar.
    #[error("Machine parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A machine is syntactically well formed but structurally invalid.
    #[error("Machine validation error: {0}")]
    ValidationError(String),
    /// A batch holds fewer machine lines than expected.
    #[error("Batch contains too few machines: found {found}, expected {expected}")]
    TruncatedBatch { found: usize, expected: usize },
    /// A file system operation other than "file is absent" failed.
    #[error("File error: {0}")]
    FileError(String),
    /// A checkpoint file could not be loaded.
    #[error("{}: {source}", .path.display())]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: Box<BeaverError>,
    },
}

impl BeaverError {
    /// Returns `true` when the error, or the error it wraps, is a truncated batch.
    pub fn is_truncated(&self) -> bool {
        match self {
            BeaverError::TruncatedBatch { .. } => true,
            BeaverError::Checkpoint { source, .. } => source.is_truncated(),
            _ => false,
        }
    }
}
