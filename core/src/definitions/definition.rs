//! Ability definition types
//!
//! Definitions are immutable templates resolved from metadata records. Every
//! live ability instance owns its own copy of one.

use evo_types::{
    AbilityRecord, AbilityType, ChangeKind, ConditionKind, OwnerKind, RecordValue, SlotKind,
    ValueKind, ValueRecord,
};

use super::ConditionTarget;
use crate::values::{EnumType, Value};

/// One resolved value slot
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSlot {
    pub kind: SlotKind,

    /// Configured value. Numeric slots of DECREASE abilities are stored negated.
    pub value: Value,

    /// Flag table for enum slots ([`EnumType::Unknown`] otherwise)
    pub enum_type: EnumType,

    pub change_type: ChangeKind,
    pub external_change_type: ChangeKind,
}

impl ValueSlot {
    /// Single numeric value (the only slots ratio/abs arithmetic applies to)
    pub fn is_numeric(&self) -> bool {
        self.kind == SlotKind::Number
    }

    /// Scalar slot: numeric or enum
    pub fn is_single_value(&self) -> bool {
        matches!(self.kind, SlotKind::Number | SlotKind::Enum)
    }

    fn resolve(
        record: &ValueRecord,
        change_type: ChangeKind,
        external_change_type: ChangeKind,
        ignore_case: bool,
    ) -> ValueSlot {
        let change_type = record.change_type.unwrap_or(change_type);
        let external_change_type = record.external_change_type.unwrap_or(external_change_type);
        let enum_type = match record.kind {
            SlotKind::Enum => {
                EnumType::resolve(record.enum_type.as_deref().unwrap_or_default(), ignore_case)
            }
            _ => EnumType::Unknown,
        };

        let value = match record.kind {
            SlotKind::Number => {
                let magnitude = record_number(&record.value);
                // stored negated so inactive inversion and accumulation are plain sums
                if change_type == ChangeKind::Decrease && magnitude > 0.0 {
                    Value::Number(-magnitude)
                } else {
                    Value::Number(magnitude)
                }
            }
            SlotKind::Enum => {
                let text = record.value.to_text();
                match enum_type.parse(&text, ignore_case) {
                    Some(bits) => Value::enum_value(enum_type, bits),
                    None => Value::Text(text),
                }
            }
            SlotKind::Text => Value::Text(record.value.to_text()),
            SlotKind::Sequence => record_sequence(&record.value),
        };

        ValueSlot {
            kind: record.kind,
            value,
            enum_type,
            change_type,
            external_change_type,
        }
    }
}

fn record_number(value: &RecordValue) -> f32 {
    match value {
        RecordValue::Int(v) => *v as f32,
        RecordValue::Float(v) => *v as f32,
        RecordValue::Bool(v) => f32::from(u8::from(*v)),
        RecordValue::Text(s) => s.trim().parse::<f32>().unwrap_or(0.0),
        RecordValue::List(_) => 0.0,
    }
}

fn record_element(value: &RecordValue) -> Value {
    match value {
        RecordValue::Int(_) | RecordValue::Float(_) | RecordValue::Bool(_) => {
            Value::Number(record_number(value))
        }
        RecordValue::Text(s) => match s.trim().parse::<f32>() {
            Ok(v) => Value::Number(v),
            Err(_) => Value::Text(s.clone()),
        },
        RecordValue::List(_) => record_sequence(value),
    }
}

fn record_sequence(value: &RecordValue) -> Value {
    match value {
        RecordValue::List(items) => Value::Sequence(items.iter().map(record_element).collect()),
        RecordValue::Text(s) => Value::Sequence(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| record_element(&RecordValue::Text(part.to_string())))
                .collect(),
        ),
        other => Value::Sequence(vec![record_element(other)]),
    }
}

/// Definition of an ability (resolved from metadata)
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityDefinition {
    /// Unique identifier of this ability
    pub meta_id: i32,

    pub owner_meta_id: i32,
    pub owner_kind: OwnerKind,

    // ─── Classification ─────────────────────────────────────────────────────
    pub ability_type: AbilityType,

    /// Free-form refinement consumers filter on (empty = none)
    pub ability_sub_type: String,

    // ─── Trigger ────────────────────────────────────────────────────────────
    pub condition: ConditionKind,

    /// Raw condition configuration, kept for display
    pub condition_value_type: String,
    pub condition_value: String,

    pub condition_target: ConditionTarget,

    // ─── Value policy ───────────────────────────────────────────────────────
    pub change_type: ChangeKind,
    pub value_type: ValueKind,

    pub external_apply_type: Option<String>,
    pub external_change_type: ChangeKind,
    pub external_value_type: ValueKind,

    /// Skill or sub effect targeted by metadata overlay types
    pub apply_meta_id: i32,

    // ─── Timing ─────────────────────────────────────────────────────────────
    /// Uses before exhaustion (0 = unlimited)
    pub count: u32,

    /// Seconds the ability stays applied (0 = indefinitely)
    pub duration: f32,

    /// Seconds before re-activation is allowed
    pub cool_time: f32,

    pub values: Vec<ValueSlot>,
}

impl AbilityDefinition {
    /// Resolve a metadata record.
    ///
    /// Enum names are matched case-insensitively when `ignore_case` is set.
    /// Resolution never fails; malformed values degrade to 0 or pass-through.
    pub fn from_record(record: &AbilityRecord, ignore_case: bool) -> AbilityDefinition {
        let condition_target = ConditionTarget::resolve(
            record.condition,
            &record.condition_value_type,
            record.condition_value.as_ref(),
            ignore_case,
        );

        let values = record
            .values
            .iter()
            .map(|slot| {
                ValueSlot::resolve(
                    slot,
                    record.change_type,
                    record.external_change_type,
                    ignore_case,
                )
            })
            .collect();

        AbilityDefinition {
            meta_id: record.meta_id,
            owner_meta_id: record.owner_meta_id,
            owner_kind: record.owner_kind,
            ability_type: record.ability_type.clone(),
            ability_sub_type: record.ability_sub_type.clone(),
            condition: record.condition,
            condition_value_type: record.condition_value_type.clone(),
            condition_value: record
                .condition_value
                .as_ref()
                .map(RecordValue::to_text)
                .unwrap_or_default(),
            condition_target,
            change_type: record.change_type,
            value_type: record.value_type,
            external_apply_type: record
                .external_apply_type
                .clone()
                .filter(|key| !key.is_empty()),
            external_change_type: record.external_change_type,
            external_value_type: record.external_value_type,
            apply_meta_id: record.apply_meta_id,
            count: record.count,
            duration: record.duration.max(0.0),
            cool_time: record.cool_time.max(0.0),
            values,
        }
    }

    /// Invalid definitions never activate.
    pub fn is_valid(&self) -> bool {
        self.condition != ConditionKind::None
    }

    pub fn slot(&self, index: usize) -> Option<&ValueSlot> {
        self.values.get(index)
    }

    /// Configured value of slot `index` (DECREASE numeric slots already negated)
    pub fn converted_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|slot| &slot.value)
    }

    pub fn is_single_value_slot(&self, index: usize) -> bool {
        self.values
            .get(index)
            .is_some_and(ValueSlot::is_single_value)
    }

    pub fn is_numeric_slot(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(ValueSlot::is_numeric)
    }

    /// Change type of slot `index`, falling back to the ability's.
    pub fn change_type_at(&self, index: usize) -> ChangeKind {
        self.values
            .get(index)
            .map_or(self.change_type, |slot| slot.change_type)
    }

    /// External change type of slot `index`, falling back to the ability's.
    pub fn external_change_type_at(&self, index: usize) -> ChangeKind {
        self.values
            .get(index)
            .map_or(self.external_change_type, |slot| slot.external_change_type)
    }

    /// Ability type and sub type as shown in listings ("HP", "ATK_DMG/FIRE")
    pub fn type_label(&self) -> String {
        if self.ability_sub_type.is_empty() {
            self.ability_type.to_string()
        } else {
            format!("{}/{}", self.ability_type, self.ability_sub_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(change_type: ChangeKind, values: Vec<ValueRecord>) -> AbilityRecord {
        AbilityRecord {
            meta_id: 1,
            owner_meta_id: 100,
            owner_kind: OwnerKind::Unit,
            ability_type: AbilityType::from("ATK"),
            ability_sub_type: String::new(),
            condition: ConditionKind::Always,
            condition_value_type: String::new(),
            condition_value: None,
            change_type,
            value_type: ValueKind::ABS,
            external_apply_type: Some(String::new()),
            external_change_type: ChangeKind::Increase,
            external_value_type: ValueKind::NONE,
            apply_meta_id: 0,
            count: 0,
            duration: -1.0,
            cool_time: 0.0,
            values,
        }
    }

    fn number(v: i64) -> ValueRecord {
        ValueRecord {
            value: RecordValue::Int(v),
            ..ValueRecord::default()
        }
    }

    #[test]
    fn decrease_negates_numeric_slots() {
        let raw = record(ChangeKind::Decrease, vec![number(5)]);
        let def = AbilityDefinition::from_record(&raw, true);
        assert_eq!(def.converted_value(0), Some(&Value::Number(-5.0)));
        assert_eq!(def.duration, 0.0);
        assert_eq!(def.external_apply_type, None);
    }

    #[test]
    fn per_slot_change_type_overrides() {
        let mut second = number(3);
        second.change_type = Some(ChangeKind::Decrease);
        let raw = record(ChangeKind::Increase, vec![number(5), second]);
        let def = AbilityDefinition::from_record(&raw, true);

        assert_eq!(def.change_type_at(0), ChangeKind::Increase);
        assert_eq!(def.change_type_at(1), ChangeKind::Decrease);
        assert_eq!(def.change_type_at(9), ChangeKind::Increase);
        assert_eq!(def.converted_value(1), Some(&Value::Number(-3.0)));
    }

    #[test]
    fn enum_and_sequence_slots() {
        let slot = ValueRecord {
            kind: SlotKind::Enum,
            value: RecordValue::Text("flying".into()),
            enum_type: Some("UnitType".into()),
            ..ValueRecord::default()
        };
        let seq = ValueRecord {
            kind: SlotKind::Sequence,
            value: RecordValue::List(vec![RecordValue::Int(1), RecordValue::Text("fire".into())]),
            ..ValueRecord::default()
        };
        let raw = record(ChangeKind::Enable, vec![slot, seq]);
        let def = AbilityDefinition::from_record(&raw, true);

        let flying = Value::enum_value(EnumType::UnitType, 8);
        assert_eq!(def.converted_value(0), Some(&flying));
        assert!(def.is_single_value_slot(0));
        assert!(!def.is_numeric_slot(0));
        let sequence = Value::Sequence(vec![Value::Number(1.0), Value::from("fire")]);
        assert_eq!(def.converted_value(1), Some(&sequence));
        assert!(!def.is_single_value_slot(1));
    }

    #[test]
    fn none_condition_is_invalid() {
        let mut raw = record(ChangeKind::Increase, vec![number(1)]);
        raw.condition = ConditionKind::None;
        assert!(!AbilityDefinition::from_record(&raw, true).is_valid());
    }
}
