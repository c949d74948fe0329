//! Replay scenarios
//!
//! A scenario names one owner, its base stats, and a timeline of engine
//! calls. Time between steps is fed to the ability set as ticks.
//!
//! ```toml
//! [owner]
//! kind = "unit"
//! meta_id = 10
//!
//! [owner.stats]
//! ATK = 10
//!
//! [[step]]
//! at_secs = 0.0
//! action = "evaluate"
//! condition = "ALWAYS"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use evo_core::{ConditionInputs, ConditionKind, ExternalPayload, OwnerKind, Value};
use evo_types::RecordValue;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,

    pub owner: OwnerSpec,

    /// Replay runs at least until this combat time
    #[serde(default)]
    pub end_secs: f32,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerSpec {
    #[serde(default)]
    pub kind: OwnerKind,

    pub meta_id: i32,

    /// Explicit ability IDs; empty means every catalog ability of this owner
    #[serde(default)]
    pub abilities: Vec<i32>,

    #[serde(default)]
    pub stats: BTreeMap<String, RecordValue>,
}

/// One timeline entry
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Evaluate {
        #[serde(default)]
        at_secs: f32,
        condition: ConditionKind,
        #[serde(default = "default_true")]
        activate: bool,
        #[serde(default)]
        cooldown: bool,
        #[serde(default)]
        inputs: Vec<RecordValue>,
        #[serde(default)]
        payload: BTreeMap<String, f32>,
    },
    PostEvaluate {
        #[serde(default)]
        at_secs: f32,
        condition: ConditionKind,
    },
    Apply {
        #[serde(default)]
        at_secs: f32,
        ability_type: String,
        #[serde(default)]
        sub_type: String,
        #[serde(default)]
        payload: BTreeMap<String, f32>,
    },
    Consume {
        #[serde(default)]
        at_secs: f32,
        ability_type: String,
        #[serde(default)]
        sub_type: String,
    },
}

fn default_true() -> bool {
    true
}

impl Step {
    pub fn at_secs(&self) -> f32 {
        match self {
            Step::Evaluate { at_secs, .. }
            | Step::PostEvaluate { at_secs, .. }
            | Step::Apply { at_secs, .. }
            | Step::Consume { at_secs, .. } => *at_secs,
        }
    }

    /// One-line description for verbose output
    pub fn describe(&self) -> String {
        match self {
            Step::Evaluate {
                condition,
                activate,
                inputs,
                ..
            } => {
                let verb = if *activate { "activate" } else { "deactivate" };
                if inputs.is_empty() {
                    format!("evaluate {condition} ({verb})")
                } else {
                    let inputs: Vec<String> = inputs.iter().map(RecordValue::to_text).collect();
                    let inputs = inputs.join(", ");
                    format!("evaluate {condition} ({verb}) inputs=[{inputs}]")
                }
            }
            Step::PostEvaluate { condition, .. } => format!("post-evaluate {condition}"),
            Step::Apply { ability_type, .. } => format!("apply {ability_type}"),
            Step::Consume { ability_type, .. } => format!("consume {ability_type}"),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut scenario: Scenario = toml::from_str(content)?;
        // stable sort keeps file order for steps sharing a timestamp
        scenario
            .steps
            .sort_by(|a, b| a.at_secs().total_cmp(&b.at_secs()));
        Ok(scenario)
    }

    /// Time the replay must reach
    pub fn duration(&self) -> f32 {
        self.steps
            .last()
            .map_or(0.0, Step::at_secs)
            .max(self.end_secs)
    }
}

pub fn record_to_value(record: &RecordValue) -> Value {
    match record {
        RecordValue::Int(v) => Value::Number(*v as f32),
        RecordValue::Float(v) => Value::Number(*v as f32),
        RecordValue::Bool(v) => Value::Number(if *v { 1.0 } else { 0.0 }),
        RecordValue::Text(s) => Value::Text(s.clone()),
        RecordValue::List(items) => Value::Sequence(items.iter().map(record_to_value).collect()),
    }
}

pub fn condition_inputs(inputs: &[RecordValue]) -> ConditionInputs {
    ConditionInputs::new(inputs.iter().map(record_to_value).collect())
}

/// `None` for an empty payload table
pub fn external_payload(payload: &BTreeMap<String, f32>) -> Option<ExternalPayload> {
    if payload.is_empty() {
        return None;
    }
    Some(payload.iter().map(|(k, v)| (k.clone(), *v)).collect())
}
