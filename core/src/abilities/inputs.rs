//! Evaluation inputs: condition operands and external payloads

use hashbrown::HashMap;

use crate::values::Value;

/// Positional operands handed to condition checks.
///
/// Layout by condition: HP `[hp, hp_max]`, attack/damaged
/// `[unit_type, unit_category]`, specific skill `[skill_id]`, sub effect
/// `[battle_tag]`. Reading past the end returns the last operand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionInputs(Vec<Value>);

impl ConditionInputs {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn hp(hp: i32, hp_max: i32) -> Self {
        Self(vec![Value::from(hp), Value::from(hp_max)])
    }

    pub fn opponent(unit_type: i64, unit_category: i64) -> Self {
        Self(vec![
            Value::Number(unit_type as f32),
            Value::Number(unit_category as f32),
        ])
    }

    pub fn skill(skill_id: i32) -> Self {
        Self(vec![Value::from(skill_id)])
    }

    pub fn battle_tag(tag: &str) -> Self {
        Self(vec![Value::from(tag)])
    }

    /// Operand `index`, clamped to the last one.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index).or_else(|| self.0.last())
    }

    /// Numeric operand `index` (0 when absent)
    pub fn number(&self, index: usize) -> f32 {
        self.get(index).map_or(0.0, Value::as_f32)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for ConditionInputs {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// Named external magnitudes (e.g. the attacker's damage) an ability may
/// fold into its own magnitude via `external_apply_type`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalPayload {
    entries: HashMap<String, f32>,
}

impl ExternalPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: f32) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f32) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for ExternalPayload {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        let mut payload = ExternalPayload::new();
        for (key, value) in iter {
            payload.insert(key, value);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_clamp_to_last_operand() {
        let inputs = ConditionInputs::hp(30, 100);
        assert_eq!(inputs.number(0), 30.0);
        assert_eq!(inputs.number(1), 100.0);
        assert_eq!(inputs.number(5), 100.0);
        assert_eq!(ConditionInputs::none().get(0), None);
        assert_eq!(ConditionInputs::none().number(0), 0.0);
    }

    #[test]
    fn payload_lookup() {
        let payload: ExternalPayload = [("DMG", 40.0), ("HEAL", 5.0)].into_iter().collect();
        assert_eq!(payload.get("DMG"), Some(40.0));
        assert_eq!(payload.get("dmg"), None);
        assert_eq!(payload.len(), 2);
    }
}
