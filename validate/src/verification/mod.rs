//! Checkpoint verification for scenario validation
//!
//! Defines expected ability/stat state and verifies it against actual behavior.

pub mod checkpoint;

pub use checkpoint::{CheckpointVerifier, Expectations, Snapshot};
