//! This crate provides the core logic of a binary Turing machine search.
//! It includes modules for enumerating machines by index, simulating their execution,
//! encoding them as text, and checkpointing batches of machines so a search can resume.

pub mod analyzer;
pub mod batch;
pub mod checkpoint;
pub mod encoder;
pub mod indexer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `Batch` struct from the batch module.
pub use batch::Batch;
/// Re-exports the checkpoint loop and its configuration and reports.
pub use checkpoint::{BatchSource, CheckpointLoop, CycleReport, LoopConfig};
/// Re-exports the encoding functions from the encoder module.
pub use encoder::{decode, decode_batch, encode, encode_batch};
/// Re-exports the `CheckpointStore` struct from the loader module.
pub use loader::{CheckpointStore, StagedBatch};
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the types describing machines and their errors from the types module.
pub use types::{
    BeaverError, Direction, MachineDescriptor, Step, Transition, BATCH_SIZE, TICKS_PER_PASS,
};
