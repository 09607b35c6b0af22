//! This module provides functions for analyzing decoded machines to detect structural errors
//! before they are simulated. This includes checks for the state count, the transition table
//! size, state references, and the head position.

use crate::types::{BeaverError, MachineDescriptor};
use crate::{indexer::MIN_STATES, machine::TuringMachine};

/// Represents the errors that can be found while analyzing a machine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The machine has fewer states than any enumerated machine.
    TooFewStates(u32),
    /// The transition table does not hold `2 * (num_states - 1)` entries.
    TableSize { expected: usize, found: usize },
    /// The current state is not one of the machine's states.
    InvalidState(u32),
    /// Transitions reference states the machine does not have. Holds the table offsets.
    UndefinedNextStates(Vec<usize>),
    /// The head lies outside the materialized tape window.
    InvalidHead(usize),
}

impl From<AnalysisError> for BeaverError {
    /// Converts an `AnalysisError` into a `BeaverError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::TooFewStates(n) => BeaverError::ValidationError(format!(
                "Machine has {} states, at least {} are required",
                n, MIN_STATES
            )),
            AnalysisError::TableSize { expected, found } => BeaverError::ValidationError(
                format!("Expected {} transitions, found {}", expected, found),
            ),
            AnalysisError::InvalidState(state) => {
                BeaverError::ValidationError(format!("Invalid state: {}", state))
            }
            AnalysisError::UndefinedNextStates(offsets) => BeaverError::ValidationError(
                format!("Transitions reference undefined states at {:?}", offsets),
            ),
            AnalysisError::InvalidHead(pos) => {
                BeaverError::ValidationError(format!("Invalid head position: {}", pos))
            }
        }
    }
}

/// Analyzes a machine for structural errors.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(BeaverError::ValidationError)` describing the first violated rule.
pub fn analyze(machine: &TuringMachine) -> Result<(), BeaverError> {
    check_descriptor(machine.descriptor())?;
    check_state(machine)?;
    check_head(machine)?;

    Ok(())
}

/// Checks the state count, table size and state references of a descriptor.
pub fn check_descriptor(descriptor: &MachineDescriptor) -> Result<(), AnalysisError> {
    if descriptor.num_states < MIN_STATES {
        return Err(AnalysisError::TooFewStates(descriptor.num_states));
    }

    let expected = MachineDescriptor::table_len(descriptor.num_states);
    if descriptor.transitions.len() != expected {
        return Err(AnalysisError::TableSize {
            expected,
            found: descriptor.transitions.len(),
        });
    }

    let undefined = descriptor
        .transitions
        .iter()
        .enumerate()
        .filter(|(_, t)| t.next_state >= descriptor.num_states)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedNextStates(undefined));
    }

    Ok(())
}

fn check_state(machine: &TuringMachine) -> Result<(), AnalysisError> {
    if machine.state() >= machine.num_states() {
        return Err(AnalysisError::InvalidState(machine.state()));
    }

    Ok(())
}

fn check_head(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let tape = machine.tape();
    if tape.position() >= tape.len() {
        return Err(AnalysisError::InvalidHead(tape.position()));
    }

    Ok(())
}
