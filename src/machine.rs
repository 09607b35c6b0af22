//! This module defines the `TuringMachine` struct, which simulates a binary Turing machine.
//! It holds the machine's descriptor, current state, tape and tick count, and applies the
//! transition table one tick at a time.

use crate::indexer;
use crate::tape::Tape;
use crate::types::{MachineDescriptor, Step, HALT_STATE, INITIAL_STATE};

/// Represents a binary Turing machine at some point of its execution.
///
/// A machine is created fresh from its enumeration index or rebuilt from a checkpoint line,
/// and is only mutated by [`TuringMachine::step`] and [`TuringMachine::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuringMachine {
    descriptor: MachineDescriptor,
    state: u32,
    tape: Tape,
    ticks: u64,
}

impl TuringMachine {
    /// Creates a machine in its initial configuration: state 1, a blank single-cell tape
    /// and no ticks.
    pub fn new(descriptor: MachineDescriptor) -> Self {
        Self::from_parts(descriptor, INITIAL_STATE, Tape::new(), 0)
    }

    /// Creates the machine at `machine_number` in the canonical enumeration.
    pub fn from_number(machine_number: u64) -> Self {
        Self::new(indexer::descriptor(machine_number))
    }

    /// Assembles a machine from its persisted parts without validating them.
    ///
    /// Use [`crate::analyzer::analyze`] to check the result.
    pub fn from_parts(descriptor: MachineDescriptor, state: u32, tape: Tape, ticks: u64) -> Self {
        Self {
            descriptor,
            state,
            tape,
            ticks,
        }
    }

    /// Executes a single tick.
    ///
    /// A halted machine is left untouched. Otherwise the tick is counted, the transition for
    /// the current state and the bit under the head is applied, and the head moves.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if the machine can keep running.
    /// * `Step::Halt` if the machine is in the halting state.
    /// * `Step::Exhausted` if the tick counter cannot grow any further.
    pub fn step(&mut self) -> Step {
        if self.is_halted() {
            return Step::Halt;
        }

        let Some(ticks) = self.ticks.checked_add(1) else {
            return Step::Exhausted;
        };

        // Validated machines always have an entry here.
        let transition = match self.descriptor.transition(self.state, self.tape.read()) {
            Some(t) => *t,
            None => return Step::Halt,
        };

        self.ticks = ticks;
        self.state = transition.next_state;
        self.tape.write(transition.write);
        self.tape.move_head(transition.direction);

        if self.is_halted() {
            Step::Halt
        } else {
            Step::Continue
        }
    }

    /// Advances the machine by up to `ticks` ticks, stopping early once it halts or its
    /// tick counter is exhausted.
    ///
    /// # Returns
    ///
    /// * The number of ticks actually executed.
    pub fn advance(&mut self, ticks: u64) -> u64 {
        let start = self.ticks;
        for _ in 0..ticks {
            if self.step() != Step::Continue {
                break;
            }
        }

        self.ticks - start
    }

    /// Returns the current state.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Returns the number of states, including the halting state.
    pub fn num_states(&self) -> u32 {
        self.descriptor.num_states
    }

    /// Returns the machine's descriptor.
    pub fn descriptor(&self) -> &MachineDescriptor {
        &self.descriptor
    }

    /// Returns the machine's tape.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the total number of ticks executed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Checks if the machine is in the halting state.
    pub fn is_halted(&self) -> bool {
        self.state == HALT_STATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Transition};

    fn transition(next_state: u32, write: bool, direction: Direction) -> Transition {
        Transition {
            next_state,
            write,
            direction,
        }
    }

    /// A 2-state machine that writes a 1 and moves right forever.
    fn runaway() -> TuringMachine {
        TuringMachine::new(MachineDescriptor {
            num_states: 2,
            transitions: vec![
                transition(1, true, Direction::Right),
                transition(1, true, Direction::Right),
            ],
        })
    }

    #[test]
    fn test_machine_creation() {
        let machine = TuringMachine::from_number(0);

        assert_eq!(machine.state(), INITIAL_STATE);
        assert_eq!(machine.num_states(), 2);
        assert_eq!(machine.ticks(), 0);
        assert_eq!(machine.tape(), &Tape::new());
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_machine_zero_halts_after_one_tick() {
        let mut machine = TuringMachine::from_number(0);

        let result = machine.step();

        assert_eq!(result, Step::Halt);
        assert_eq!(machine.state(), HALT_STATE);
        assert_eq!(machine.ticks(), 1);
        assert_eq!(machine.tape().bits(), "00");
        assert_eq!(machine.tape().position(), 0);
    }

    #[test]
    fn test_advance_consumes_budget() {
        let mut machine = runaway();

        assert_eq!(machine.advance(5), 5);
        assert_eq!(machine.ticks(), 5);
        assert_eq!(machine.tape().bits(), "111110");
        assert_eq!(machine.tape().position(), 5);

        assert_eq!(machine.advance(0), 0);
        assert_eq!(machine.ticks(), 5);
    }

    #[test]
    fn test_advance_stops_at_halt() {
        let mut machine = TuringMachine::from_number(0);

        assert_eq!(machine.advance(10), 1);
        assert!(machine.is_halted());
    }

    #[test]
    fn test_halted_machine_is_unchanged() {
        let mut machine = TuringMachine::from_number(0);
        machine.advance(1);
        let halted = machine.clone();

        for budget in [0, 1, 100] {
            assert_eq!(machine.advance(budget), 0);
            assert_eq!(machine.step(), Step::Halt);
            assert_eq!(machine, halted);
        }
    }

    #[test]
    fn test_tick_counter_saturates() {
        let line = "2\t1\t1 1 1 1 1 1 \t0\t0\t18446744073709551615";
        let mut machine = crate::parser::parse(line).unwrap();
        let before = machine.clone();

        assert_eq!(machine.step(), Step::Exhausted);
        assert_eq!(machine.advance(1), 0);
        assert_eq!(machine.advance(100), 0);
        assert_eq!(machine.ticks(), u64::MAX);
        assert_eq!(machine, before);
    }

    #[test]
    fn test_advance_stops_at_tick_limit() {
        let template = runaway();
        let mut machine = TuringMachine::from_parts(
            template.descriptor().clone(),
            template.state(),
            Tape::new(),
            u64::MAX - 3,
        );

        assert_eq!(machine.advance(10), 3);
        assert_eq!(machine.ticks(), u64::MAX);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_reading_one_uses_doubled_offset() {
        // State 2 reading 1 consults entry (2 - 1) * 2 = 2.
        let mut machine = TuringMachine::from_parts(
            MachineDescriptor {
                num_states: 3,
                transitions: vec![
                    transition(2, true, Direction::Right),
                    transition(1, false, Direction::Left),
                    transition(0, true, Direction::Left),
                    transition(1, true, Direction::Left),
                ],
            },
            2,
            Tape::from_bits("1", 0).unwrap(),
            7,
        );

        assert_eq!(machine.step(), Step::Halt);
        assert_eq!(machine.ticks(), 8);
        assert_eq!(machine.tape().bits(), "01");
    }

    #[test]
    fn test_busy_beaver_two_state_shape() {
        // 1: 0 -> 1 R 2, 1 -> shared entry; 2: 0 -> 1 L 1, 1 -> 1 R halt
        let mut machine = TuringMachine::new(MachineDescriptor {
            num_states: 3,
            transitions: vec![
                transition(2, true, Direction::Right),
                transition(1, true, Direction::Left),
                transition(0, true, Direction::Right),
                transition(0, false, Direction::Left),
            ],
        });

        let ticks = machine.advance(100);

        assert!(machine.is_halted());
        assert_eq!(ticks, machine.ticks());
        assert!(machine.tape().ones() > 0);
    }
}
