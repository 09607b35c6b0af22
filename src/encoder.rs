//! This module provides the canonical text encoding of machines and batches.
//!
//! A machine line has six tab-separated fields:
//! `<num_states>\t<state>\t<transitions>\t<position>\t<tape>\t<ticks>`, where every
//! transition is written as `next_state write direction ` with a trailing space.

use crate::machine::TuringMachine;
use crate::parser::parse;
use crate::types::BeaverError;
use tracing::trace;

/// Encodes a machine as its canonical line, without a trailing newline.
pub fn encode(machine: &TuringMachine) -> String {
    let mut out = format!("{}\t{}\t", machine.num_states(), machine.state());

    for transition in &machine.descriptor().transitions {
        out.push_str(&format!(
            "{} {} {} ",
            transition.next_state,
            transition.write as u8,
            transition.direction.as_bit() as u8
        ));
    }

    out.push_str(&format!("\t{}\t{}", machine.tape(), machine.ticks()));
    out
}

/// Decodes a canonical line back into a machine.
///
/// # Returns
///
/// * `Result<TuringMachine, BeaverError>` - The decoded machine or the parse/validation error.
pub fn decode(line: &str) -> Result<TuringMachine, BeaverError> {
    parse(line)
}

/// Encodes machines one per line, each line terminated by a newline.
pub fn encode_batch<'a>(machines: impl IntoIterator<Item = &'a TuringMachine>) -> String {
    machines.into_iter().fold(String::new(), |mut out, machine| {
        out.push_str(&encode(machine));
        out.push('\n');
        out
    })
}

/// Returns `true` if the line carries a machine. Other lines are comments or blanks.
pub fn is_machine_line(line: &str) -> bool {
    line.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// Decodes the first `count` machine lines of `content`.
///
/// Lines that do not start with a decimal digit are skipped, and anything after the
/// `count`-th machine line is ignored.
///
/// # Returns
///
/// * `Ok(Vec<TuringMachine>)` holding exactly `count` machines.
/// * `Err(BeaverError::TruncatedBatch)` if fewer machine lines are present.
/// * `Err(BeaverError::ParseError)` or `Err(BeaverError::ValidationError)` for a bad line.
pub fn decode_batch(content: &str, count: usize) -> Result<Vec<TuringMachine>, BeaverError> {
    let mut machines = Vec::with_capacity(count);

    for line in content.lines() {
        if machines.len() == count {
            break;
        }

        if !is_machine_line(line) {
            trace!(line = %line, "skipping non-machine line");
            continue;
        }

        machines.push(decode(line)?);
    }

    if machines.len() < count {
        return Err(BeaverError::TruncatedBatch {
            found: machines.len(),
            expected: count,
        });
    }

    Ok(machines)
}
