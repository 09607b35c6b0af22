//! This module defines `Batch`, the group of machines persisted together under one
//! checkpoint file.

use crate::encoder::{decode_batch, encode_batch};
use crate::machine::TuringMachine;
use crate::types::BeaverError;

/// A fixed-size, ordered group of machines identified by a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    cursor: u64,
    machines: Vec<TuringMachine>,
}

impl Batch {
    /// Creates fresh machines for indices `cursor..cursor + size`.
    ///
    /// Indices past `u64::MAX` are not generated.
    pub fn generate(cursor: u64, size: usize) -> Self {
        let machines = (0..size as u64)
            .map_while(|offset| cursor.checked_add(offset))
            .map(TuringMachine::from_number)
            .collect();

        Self { cursor, machines }
    }

    /// Decodes exactly `size` machines from the content of a checkpoint file.
    pub fn decode(cursor: u64, content: &str, size: usize) -> Result<Self, BeaverError> {
        let machines = decode_batch(content, size)?;
        Ok(Self { cursor, machines })
    }

    /// Encodes the batch as the content of a checkpoint file.
    pub fn encode(&self) -> String {
        encode_batch(&self.machines)
    }

    /// Advances every machine by up to `ticks` ticks.
    ///
    /// # Returns
    ///
    /// * The total number of ticks executed across the batch.
    pub fn advance(&mut self, ticks: u64) -> u64 {
        self.machines
            .iter_mut()
            .map(|machine| machine.advance(ticks))
            .sum()
    }

    /// Returns the cursor naming this batch.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Returns the machines of the batch.
    pub fn machines(&self) -> &[TuringMachine] {
        &self.machines
    }

    /// Returns the number of machines in the batch.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Checks if the batch holds no machines.
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Returns the number of halted machines.
    pub fn halted(&self) -> usize {
        self.machines.iter().filter(|m| m.is_halted()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BATCH_SIZE;

    #[test]
    fn test_generate() {
        let batch = Batch::generate(40, BATCH_SIZE);

        assert_eq!(batch.cursor(), 40);
        assert_eq!(batch.len(), BATCH_SIZE);
        for (offset, machine) in batch.machines().iter().enumerate() {
            assert_eq!(machine, &TuringMachine::from_number(40 + offset as u64));
        }
    }

    #[test]
    fn test_generate_stops_at_last_index() {
        let batch = Batch::generate(u64::MAX - 2, BATCH_SIZE);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_encode_decode() {
        let mut batch = Batch::generate(60, BATCH_SIZE);
        batch.advance(3);

        let decoded = Batch::decode(60, &batch.encode(), BATCH_SIZE).unwrap();
        assert_eq!(decoded, batch);
    }

    #[test]
    fn test_advance() {
        let mut batch = Batch::generate(0, BATCH_SIZE);

        let spent = batch.advance(4);

        assert_eq!(
            spent,
            batch.machines().iter().map(|m| m.ticks()).sum::<u64>()
        );
        assert!(batch.halted() > 0);
        assert_eq!(batch.advance(0), 0);
    }
}
