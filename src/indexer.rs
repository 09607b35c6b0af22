//! This module maps natural numbers onto machine descriptors and back.
//!
//! Machines are enumerated by ascending state count. A machine with `n` states is fully
//! described by its transition table, a function from `{1..n-1} x {0,1}` to
//! `{0..n-1} x {0,1} x {L,R}`. The domain has `2(n-1)` elements and the codomain `4n`, so
//! there are `(4n)^(2(n-1))` machines with `n` states: indices `0..64` are the 2-state
//! machines, `64..64+20736` the 3-state machines, and so on.
//!
//! Within a block the rank is decoded as a mixed-radix number, least significant digit
//! first, with digits `next_state` (radix `n`), `write` (radix 2) and `direction` (radix 2)
//! for each table entry in turn.

use crate::types::{Direction, MachineDescriptor, Transition};

/// The smallest state count that can be enumerated.
pub const MIN_STATES: u32 = 2;

/// Returns the number of machines with exactly `num_states` states.
///
/// Returns `None` if the count does not fit in a `u128` or `num_states` is below
/// [`MIN_STATES`].
pub fn block_size(num_states: u32) -> Option<u128> {
    if num_states < MIN_STATES {
        return None;
    }

    let outcomes = 4u128.checked_mul(num_states as u128)?;
    let exponent = 2 * (num_states - 1);
    outcomes.checked_pow(exponent)
}

/// Returns the index of the first machine with `num_states` states.
pub fn first_index(num_states: u32) -> Option<u128> {
    (MIN_STATES..num_states).try_fold(0u128, |below, n| below.checked_add(block_size(n)?))
}

/// Finds the block a machine index falls into.
///
/// # Returns
///
/// * `(num_states, delta_number)`, where `delta_number` is the machine's rank within the
///   block of machines with `num_states` states.
pub fn locate(machine_number: u64) -> (u32, u128) {
    let target = machine_number as u128;
    let mut num_states = 1;
    let mut num_below = 0u128;
    let mut next_num = 0u128;

    // Blocks grow fast enough that every u64 is covered long before a u128 overflows.
    while target >= next_num {
        num_states += 1;
        num_below = next_num;
        next_num += block_size(num_states).unwrap_or(u128::MAX - next_num);
    }

    (num_states, target - num_below)
}

/// Reconstructs the descriptor of the machine at `machine_number`.
pub fn descriptor(machine_number: u64) -> MachineDescriptor {
    let (num_states, mut delta_number) = locate(machine_number);
    let radix = num_states as u128;

    let transitions = (0..MachineDescriptor::table_len(num_states))
        .map(|_| {
            let next_state = (delta_number % radix) as u32;
            delta_number /= radix;
            let write = delta_number % 2 == 1;
            delta_number /= 2;
            let direction = Direction::from_bit(delta_number % 2 == 1);
            delta_number /= 2;

            Transition {
                next_state,
                write,
                direction,
            }
        })
        .collect();

    MachineDescriptor {
        num_states,
        transitions,
    }
}

/// Returns the enumeration index of `descriptor`, the inverse of [`descriptor`].
///
/// Returns `None` if the descriptor is structurally invalid or its index does not fit in a
/// `u64`.
pub fn rank(descriptor: &MachineDescriptor) -> Option<u64> {
    let num_states = descriptor.num_states;
    if num_states < MIN_STATES
        || descriptor.transitions.len() != MachineDescriptor::table_len(num_states)
    {
        return None;
    }

    let radix = num_states as u128;
    let mut delta_number = 0u128;

    for transition in descriptor.transitions.iter().rev() {
        if transition.next_state >= num_states {
            return None;
        }

        delta_number = delta_number.checked_mul(2)? + transition.direction.as_bit() as u128;
        delta_number = delta_number.checked_mul(2)? + transition.write as u128;
        delta_number = delta_number.checked_mul(radix)? + transition.next_state as u128;
    }

    let index = first_index(num_states)?.checked_add(delta_number)?;
    u64::try_from(index).ok()
}
