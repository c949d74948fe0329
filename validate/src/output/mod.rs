//! Output formatting for validation results
//!
//! Provides colored CLI output and report generation.

pub mod cli;

pub use cli::{CliOutput, OutputLevel};
