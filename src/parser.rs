//! This module provides the parser for checkpointed machine lines, utilizing the `pest` crate.
//! The grammar in `grammar.pest` splits a line into typed fields; this module turns them
//! into a validated `TuringMachine`.

use crate::{
    analyzer::analyze,
    machine::TuringMachine,
    tape::Tape,
    types::{BeaverError, Direction, MachineDescriptor, Transition},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::str::FromStr;

/// Derives a `PestParser` for the machine line grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineParser;

/// Parses a single canonical line into a `TuringMachine`.
///
/// The parsed machine is validated before being returned.
///
/// # Returns
///
/// * `Ok(TuringMachine)` if the line is well formed and describes a valid machine.
/// * `Err(BeaverError::ParseError)` if a field is missing, not numeric, or the transition
///   count does not match the state count.
/// * `Err(BeaverError::ValidationError)` if the machine fails validation.
pub fn parse(input: &str) -> Result<TuringMachine, BeaverError> {
    let root = MachineParser::parse(Rule::machine, input)
        .map_err(|e| BeaverError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| BeaverError::ValidationError("Empty machine line".to_string()))?;

    let machine = parse_machine(root)?;

    analyze(&machine)?;

    Ok(machine)
}

/// Parses the fields of a `Pair<Rule::machine>` in order.
fn parse_machine(pair: Pair<Rule>) -> Result<TuringMachine, BeaverError> {
    let mut num_states: Option<u32> = None;
    let mut state: Option<u32> = None;
    let mut transitions: Option<Vec<Transition>> = None;
    let mut position: Option<(i64, Span)> = None;
    let mut tape: Option<Tape> = None;
    let mut ticks: Option<u64> = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::num_states => num_states = Some(parse_number(&p)?),
            Rule::state => state = Some(parse_number(&p)?),
            Rule::transitions => {
                let expected = MachineDescriptor::table_len(required(num_states, "num_states")?);
                transitions = Some(parse_transitions(p, expected)?);
            }
            Rule::position => position = Some((parse_number(&p)?, p.as_span())),
            Rule::tape => {
                let (position, span) = required(position, "position")?;
                tape = Some(
                    Tape::from_bits(p.as_str(), position)
                        .map_err(|e| parse_error(&e.to_string(), span))?,
                );
            }
            Rule::ticks => ticks = Some(parse_number(&p)?),
            _ => {} // EOI
        }
    }

    let descriptor = MachineDescriptor {
        num_states: required(num_states, "num_states")?,
        transitions: required(transitions, "transitions")?,
    };

    Ok(TuringMachine::from_parts(
        descriptor,
        required(state, "state")?,
        required(tape, "tape")?,
        required(ticks, "ticks")?,
    ))
}

/// Parses the `transitions` field, checking that it holds exactly `expected` entries.
fn parse_transitions(pair: Pair<Rule>, expected: usize) -> Result<Vec<Transition>, BeaverError> {
    let span = pair.as_span();

    // Rule: transitions > [transition > number, bit, bit]
    let transitions = pair
        .into_inner()
        .map(|transition| {
            let mut fields = transition.into_inner();
            let next_state = parse_number(&next_field(&mut fields, span)?)?;
            let write = parse_bit(&next_field(&mut fields, span)?);
            let direction = Direction::from_bit(parse_bit(&next_field(&mut fields, span)?));

            Ok(Transition {
                next_state,
                write,
                direction,
            })
        })
        .collect::<Result<Vec<_>, BeaverError>>()?;

    if transitions.len() != expected {
        return Err(parse_error(
            &format!(
                "Expected {} transitions, found {}",
                expected,
                transitions.len()
            ),
            span,
        ));
    }

    Ok(transitions)
}

fn next_field<'i>(
    fields: &mut pest::iterators::Pairs<'i, Rule>,
    span: Span<'i>,
) -> Result<Pair<'i, Rule>, BeaverError> {
    fields
        .next()
        .ok_or_else(|| parse_error("Incomplete transition", span))
}

/// Parses a numeric field, reporting values that do not fit the target type at their span.
fn parse_number<T: FromStr>(pair: &Pair<Rule>) -> Result<T, BeaverError> {
    pair.as_str()
        .parse::<T>()
        .map_err(|_| parse_error(&format!("Invalid number '{}'", pair.as_str()), pair.as_span()))
}

fn parse_bit(pair: &Pair<Rule>) -> bool {
    pair.as_str() == "1"
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, BeaverError> {
    value.ok_or_else(|| BeaverError::ValidationError(format!("Missing field: {}", name)))
}

/// Creates a `BeaverError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> BeaverError {
    BeaverError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}
