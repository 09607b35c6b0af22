//! This module drives the search: every cycle loads or generates one batch, advances its
//! machines, persists the result and moves the cursor.

use crate::batch::Batch;
use crate::loader::CheckpointStore;
use crate::types::{BeaverError, BATCH_SIZE, TICKS_PER_PASS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Configuration of a [`CheckpointLoop`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Directory holding the checkpoint files.
    pub directory: PathBuf,
    /// Number of machines per checkpoint file.
    pub batch_size: usize,
    /// Ticks each machine is advanced by per cycle. `0` only rewrites the batch.
    pub ticks_per_pass: u64,
    /// The cursor of the first cycle.
    pub start_cursor: u64,
}

impl LoopConfig {
    /// Checks that the configuration can drive a loop.
    ///
    /// A batch must hold at least one machine, otherwise the cursor never moves.
    pub fn validate(&self) -> Result<(), BeaverError> {
        if self.batch_size == 0 {
            return Err(BeaverError::ValidationError(
                "Batch size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            batch_size: BATCH_SIZE,
            ticks_per_pass: TICKS_PER_PASS,
            start_cursor: 0,
        }
    }
}

/// Where the batch of a cycle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchSource {
    /// Read back from an existing checkpoint file.
    Loaded,
    /// Freshly enumerated because no checkpoint file existed.
    Generated,
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// The cursor the cycle worked on.
    pub cursor: u64,
    /// Where the batch came from.
    pub source: BatchSource,
    /// The cursor of the next cycle.
    pub next_cursor: u64,
    /// Number of machines in the batch.
    pub machines: usize,
    /// Number of halted machines after processing.
    pub halted: usize,
    /// Ticks executed during processing.
    pub ticks: u64,
    /// The checkpoint file that now holds the batch.
    pub path: PathBuf,
}

/// The checkpoint loop.
///
/// A cycle at cursor `c`:
/// 1. loads `<c>.txt`, or generates machines `c..c + batch_size` if it does not exist;
/// 2. advances every machine by `ticks_per_pass`;
/// 3. writes the batch to a staging file and renames it over `<c>.txt`;
/// 4. moves on to `c + batch_size` after a load, or back to `0` after a generation.
///
/// Running out of checkpoint files means the frontier of the enumeration was reached, so
/// the next pass starts again from the first batch.
#[derive(Debug, Clone)]
pub struct CheckpointLoop {
    store: CheckpointStore,
    config: LoopConfig,
    cursor: u64,
}

impl CheckpointLoop {
    /// Creates a loop starting at `config.start_cursor`.
    ///
    /// # Returns
    ///
    /// * `Err(BeaverError::ValidationError)` if the configuration is invalid.
    pub fn new(config: LoopConfig) -> Result<Self, BeaverError> {
        config.validate()?;

        Ok(Self {
            store: CheckpointStore::new(config.directory.clone()),
            cursor: config.start_cursor,
            config,
        })
    }

    /// Returns the cursor the next cycle works on.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Returns the loop's configuration.
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Returns the store the loop reads and writes through.
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Runs a single cycle.
    ///
    /// # Returns
    ///
    /// * `Ok(CycleReport)` once the batch is persisted and the cursor has moved.
    /// * `Err(BeaverError)` if the checkpoint file is unreadable or cannot be replaced. The
    ///   cursor is left unchanged.
    pub fn run_cycle(&mut self) -> Result<CycleReport, BeaverError> {
        let cursor = self.cursor;
        let size = self.config.batch_size;

        let (mut batch, source, next_cursor) = match self.store.load(cursor, size)? {
            Some(batch) => {
                let next_cursor = cursor.checked_add(size as u64).ok_or_else(|| {
                    BeaverError::ValidationError(format!(
                        "Cursor {} cannot advance by {}",
                        cursor, size
                    ))
                })?;
                (batch, BatchSource::Loaded, next_cursor)
            }
            None => {
                debug!(cursor, size, "generating fresh machines");
                (Batch::generate(cursor, size), BatchSource::Generated, 0)
            }
        };

        let ticks = self.process(&mut batch);
        let path = self.store.persist(&batch, next_cursor)?;

        let report = CycleReport {
            cursor,
            source,
            next_cursor,
            machines: batch.len(),
            halted: batch.halted(),
            ticks,
            path,
        };

        info!(
            cursor,
            next_cursor,
            source = ?report.source,
            halted = report.halted,
            ticks,
            "checkpoint cycle complete"
        );

        self.cursor = next_cursor;
        Ok(report)
    }

    /// Runs `cycles` cycles, stopping at the first error.
    pub fn run(&mut self, cycles: usize) -> Result<Vec<CycleReport>, BeaverError> {
        (0..cycles).map(|_| self.run_cycle()).collect()
    }

    /// Advances every machine of the batch by the configured tick budget.
    fn process(&self, batch: &mut Batch) -> u64 {
        if self.config.ticks_per_pass == 0 {
            return 0;
        }

        batch.advance(self.config.ticks_per_pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::machine::TuringMachine;
    use std::fs;
    use tempfile::tempdir;

    fn config(directory: &std::path::Path, ticks_per_pass: u64) -> LoopConfig {
        LoopConfig {
            directory: directory.to_path_buf(),
            ticks_per_pass,
            ..LoopConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = LoopConfig::default();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.ticks_per_pass, 10);
        assert_eq!(config.start_cursor, 0);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let dir = tempdir().unwrap();
        let result = CheckpointLoop::new(LoopConfig {
            batch_size: 0,
            ..config(dir.path(), 1)
        });

        assert!(matches!(result, Err(BeaverError::ValidationError(_))));
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_missing_file_generates_and_resets_cursor() {
        let dir = tempdir().unwrap();
        let mut checkpoint = CheckpointLoop::new(LoopConfig {
            start_cursor: 40,
            ..config(dir.path(), 0)
        })
        .unwrap();

        let report = checkpoint.run_cycle().unwrap();

        assert_eq!(report.source, BatchSource::Generated);
        assert_eq!(report.cursor, 40);
        assert_eq!(report.next_cursor, 0);
        assert_eq!(checkpoint.cursor(), 0);

        let content = fs::read_to_string(dir.path().join("40.txt")).unwrap();
        let expected = (40..50)
            .map(|n| encode(&TuringMachine::from_number(n)) + "\n")
            .collect::<String>();
        assert_eq!(content, expected);
        assert!(!dir.path().join("0.txt~").exists());
    }

    #[test]
    fn test_existing_file_advances_cursor() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        store.persist(&Batch::generate(0, BATCH_SIZE), 10).unwrap();

        let mut checkpoint = CheckpointLoop::new(config(dir.path(), 0)).unwrap();
        let report = checkpoint.run_cycle().unwrap();

        assert_eq!(report.source, BatchSource::Loaded);
        assert_eq!(report.next_cursor, 10);
        assert_eq!(checkpoint.cursor(), 10);
        assert!(!dir.path().join("10.txt~").exists());
    }

    #[test]
    fn test_zero_ticks_round_trips_the_file() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        let mut batch = Batch::generate(0, BATCH_SIZE);
        batch.advance(3);
        store.persist(&batch, 10).unwrap();
        let before = fs::read(store.path(0)).unwrap();

        let mut checkpoint = CheckpointLoop::new(config(dir.path(), 0)).unwrap();
        checkpoint.run_cycle().unwrap();

        assert_eq!(fs::read(store.path(0)).unwrap(), before);
    }

    #[test]
    fn test_machines_progress_across_runs() {
        let dir = tempdir().unwrap();

        // First run: 0.txt is generated, then processed again from the start.
        let mut checkpoint = CheckpointLoop::new(config(dir.path(), 2)).unwrap();
        let reports = checkpoint.run(2).unwrap();
        assert_eq!(reports[0].source, BatchSource::Generated);
        assert_eq!(reports[1].source, BatchSource::Loaded);
        assert_eq!(checkpoint.cursor(), 10);

        // A new process resumes from the checkpoint files alone.
        let mut resumed = CheckpointLoop::new(config(dir.path(), 2)).unwrap();
        let report = resumed.run_cycle().unwrap();
        assert_eq!(report.source, BatchSource::Loaded);

        let batch = resumed.store().load(0, BATCH_SIZE).unwrap().unwrap();
        for (offset, machine) in batch.machines().iter().enumerate() {
            let mut expected = TuringMachine::from_number(offset as u64);
            expected.advance(6);
            assert_eq!(machine, &expected);
        }
    }

    #[test]
    fn test_cycle_sequence() {
        let dir = tempdir().unwrap();
        let mut checkpoint = CheckpointLoop::new(config(dir.path(), 1)).unwrap();

        let cursors = checkpoint
            .run(5)
            .unwrap()
            .iter()
            .map(|r| (r.cursor, r.source))
            .collect::<Vec<_>>();

        assert_eq!(
            cursors,
            vec![
                (0, BatchSource::Generated),
                (0, BatchSource::Loaded),
                (10, BatchSource::Generated),
                (0, BatchSource::Loaded),
                (10, BatchSource::Loaded),
            ]
        );
    }

    #[test]
    fn test_truncated_file_is_fatal() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        let content = Batch::generate(0, 9).encode() + "\n";
        fs::write(store.path(0), &content).unwrap();

        let mut checkpoint = CheckpointLoop::new(config(dir.path(), 1)).unwrap();
        let error = checkpoint.run_cycle().unwrap_err();

        assert!(error.is_truncated());
        assert_eq!(checkpoint.cursor(), 0);
        assert_eq!(fs::read_to_string(store.path(0)).unwrap(), content);
    }

    #[test]
    fn test_report_serialization() {
        let report = CycleReport {
            cursor: 40,
            source: BatchSource::Generated,
            next_cursor: 0,
            machines: 10,
            halted: 4,
            ticks: 70,
            path: PathBuf::from("40.txt"),
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"source\":\"generated\""));

        let decoded: CycleReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, report);
    }
}
