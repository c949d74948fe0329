//! Checkpoint-based ability verification
//!
//! Allows defining expected ability and stat state at specific scenario
//! times and verifying that actual engine behavior matches expectations.
//! A checkpoint sees the state after every step scheduled at or before its
//! time, and after the ticks leading up to it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A checkpoint defines expected state at a specific scenario time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Scenario time in seconds when to check
    pub at_secs: f32,

    /// Ability meta IDs that should be applied
    #[serde(default)]
    pub active: Vec<i32>,

    /// Ability meta IDs that should not be applied
    #[serde(default)]
    pub inactive: Vec<i32>,

    /// Expected numeric stat values
    #[serde(default)]
    pub stats: BTreeMap<String, f32>,

    /// Optional description for debugging
    #[serde(default)]
    pub description: Option<String>,
}

/// Full expectations file for a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expectations {
    pub meta: ExpectationsMeta,

    #[serde(rename = "checkpoint")]
    pub checkpoints: Vec<Checkpoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationsMeta {
    /// Scenario name this expectation file is for
    #[serde(default)]
    pub scenario: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Tolerance for stat comparisons (default 0.01)
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
}

fn default_tolerance() -> f32 {
    0.01
}

impl Expectations {
    /// Load expectations from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let mut expectations: Expectations = toml::from_str(&content)?;
        expectations
            .checkpoints
            .sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        Ok(expectations)
    }
}

/// Engine state handed to the verifier
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub applied: Vec<i32>,
    pub stats: BTreeMap<String, f32>,
}

/// Result of verifying a single checkpoint
#[derive(Debug, Clone)]
pub struct CheckpointResult {
    pub checkpoint_idx: usize,
    pub at_secs: f32,
    pub description: Option<String>,
    pub passed: bool,
    pub failures: Vec<String>,
}

/// Overall verification result
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub checkpoints_passed: u32,
    pub checkpoints_total: u32,
    pub results: Vec<CheckpointResult>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        self.checkpoints_passed == self.checkpoints_total
    }
}

/// Verifies engine behavior against expected checkpoints
#[derive(Debug)]
pub struct CheckpointVerifier {
    expectations: Expectations,
    current_checkpoint_idx: usize,
    results: Vec<CheckpointResult>,
}

impl CheckpointVerifier {
    pub fn new(expectations: Expectations) -> Self {
        Self {
            expectations,
            current_checkpoint_idx: 0,
            results: Vec::new(),
        }
    }

    /// Time of the next unverified checkpoint
    pub fn next_checkpoint_secs(&self) -> Option<f32> {
        self.expectations
            .checkpoints
            .get(self.current_checkpoint_idx)
            .map(|c| c.at_secs)
    }

    /// Time of the last checkpoint
    pub fn last_checkpoint_secs(&self) -> Option<f32> {
        self.expectations.checkpoints.last().map(|c| c.at_secs)
    }

    /// Verify the next checkpoint against `snapshot`
    pub fn verify_next(&mut self, snapshot: &Snapshot) -> Option<CheckpointResult> {
        let checkpoint = self
            .expectations
            .checkpoints
            .get(self.current_checkpoint_idx)?;
        let tolerance = self.expectations.meta.tolerance;
        let mut failures = Vec::new();

        for id in &checkpoint.active {
            if !snapshot.applied.contains(id) {
                failures.push(format!("Ability {} should be applied but is not", id));
            }
        }
        for id in &checkpoint.inactive {
            if snapshot.applied.contains(id) {
                failures.push(format!("Ability {} should not be applied", id));
            }
        }
        for (stat, expected) in &checkpoint.stats {
            match snapshot.stats.get(stat) {
                None => failures.push(format!("Stat '{}' is unknown", stat)),
                Some(actual) if (actual - expected).abs() > tolerance => failures.push(format!(
                    "Stat '{}' is {:.2}, expected {:.2}",
                    stat, actual, expected
                )),
                Some(_) => {}
            }
        }

        let result = CheckpointResult {
            checkpoint_idx: self.current_checkpoint_idx,
            at_secs: checkpoint.at_secs,
            description: checkpoint.description.clone(),
            passed: failures.is_empty(),
            failures,
        };

        self.results.push(result.clone());
        self.current_checkpoint_idx += 1;

        Some(result)
    }

    /// Get final verification result. Checkpoints never reached count as failures.
    pub fn finalize(mut self) -> VerificationResult {
        while self.current_checkpoint_idx < self.expectations.checkpoints.len() {
            let checkpoint = &self.expectations.checkpoints[self.current_checkpoint_idx];
            self.results.push(CheckpointResult {
                checkpoint_idx: self.current_checkpoint_idx,
                at_secs: checkpoint.at_secs,
                description: checkpoint.description.clone(),
                passed: false,
                failures: vec!["Checkpoint was never reached".to_string()],
            });
            self.current_checkpoint_idx += 1;
        }

        let passed = self.results.iter().filter(|r| r.passed).count() as u32;
        let total = self.results.len() as u32;

        VerificationResult {
            checkpoints_passed: passed,
            checkpoints_total: total,
            results: self.results,
        }
    }

    /// Check if all checkpoints have been processed
    pub fn is_complete(&self) -> bool {
        self.current_checkpoint_idx >= self.expectations.checkpoints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_expectations() -> Expectations {
        Expectations {
            meta: ExpectationsMeta {
                scenario: "test".to_string(),
                description: None,
                tolerance: 0.01,
            },
            checkpoints: vec![Checkpoint {
                at_secs: 2.0,
                active: vec![1001],
                inactive: vec![1002],
                stats: BTreeMap::from([("ATK".to_string(), 15.0)]),
                description: Some("buff applied".to_string()),
            }],
        }
    }

    fn snapshot(applied: Vec<i32>, atk: f32) -> Snapshot {
        Snapshot {
            applied,
            stats: BTreeMap::from([("ATK".to_string(), atk)]),
        }
    }

    #[test]
    fn test_checkpoint_pass() {
        let mut verifier = CheckpointVerifier::new(sample_expectations());
        assert_eq!(verifier.next_checkpoint_secs(), Some(2.0));

        let r = verifier.verify_next(&snapshot(vec![1001], 15.0)).unwrap();
        assert!(r.passed, "Failures: {:?}", r.failures);
        assert!(verifier.is_complete());
        assert!(verifier.verify_next(&Snapshot::default()).is_none());
    }

    #[test]
    fn test_checkpoint_fail_wrong_abilities() {
        let mut verifier = CheckpointVerifier::new(sample_expectations());

        let r = verifier.verify_next(&snapshot(vec![1002], 15.0)).unwrap();
        assert!(!r.passed);
        assert!(r.failures.iter().any(|f| f.contains("should be applied")));
        assert!(r.failures.iter().any(|f| f.contains("should not be")));
    }

    #[test]
    fn test_checkpoint_fail_wrong_stat() {
        let mut verifier = CheckpointVerifier::new(sample_expectations());

        let r = verifier.verify_next(&snapshot(vec![1001], 14.0)).unwrap();
        assert!(!r.passed);
        assert!(r.failures.iter().any(|f| f.contains("expected 15.00")));
    }

    #[test]
    fn test_unreached_checkpoints_fail() {
        let verifier = CheckpointVerifier::new(sample_expectations());
        let result = verifier.finalize();
        assert!(!result.passed());
        assert_eq!(result.checkpoints_total, 1);
    }
}
