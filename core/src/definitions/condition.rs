//! Condition targets
//!
//! The raw `condition_value_type` / `condition_value` pair of a record is
//! resolved once at load time into a [`ConditionTarget`], so evaluation never
//! has to look up types by name.

use evo_types::{ConditionKind, RecordValue, ValueKind};

use crate::abilities::ConditionInputs;
use crate::values::{EnumType, Value, has_flag};

use super::ValueSlot;

/// Placeholder the text fallback of opponent matching compares against.
///
/// See DESIGN.md, open question on the unit/category text fallback.
pub const SLOT_SEQUENCE_LABEL: &str = "ValueSlot[]";

/// What a condition compares its inputs against.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTarget {
    /// Nothing configured; satisfiable whenever the ability is available
    Any,
    /// HP threshold, as a ratio (`hp / hp_max <= value`) or absolute (`hp <= value`)
    HpThreshold { kind: ValueKind, value: f32 },
    /// Opponent unit type or category must be contained in `bits`
    OpponentFlags { ty: EnumType, bits: i64 },
    /// Configured type is neither unit type nor category
    OpponentText(String),
    /// Triggering skill must equal this id (0 = any skill)
    Skill(i64),
    /// Triggering sub effect must carry this battle tag
    BattleTag(i64),
    /// Configuration could not be interpreted; never satisfiable
    Unresolved,
}

impl ConditionTarget {
    /// Resolve the raw condition configuration of a record.
    pub fn resolve(
        condition: ConditionKind,
        value_type: &str,
        value: Option<&RecordValue>,
        ignore_case: bool,
    ) -> ConditionTarget {
        let text = value.map(RecordValue::to_text).unwrap_or_default();
        let text = text.trim();

        match condition {
            ConditionKind::HpLessThan => {
                match (value, ValueKind::parse(value_type, ignore_case)) {
                    (Some(_), Some(kind)) => ConditionTarget::HpThreshold {
                        kind,
                        value: text.parse::<f32>().unwrap_or(0.0),
                    },
                    _ => ConditionTarget::Unresolved,
                }
            }
            ConditionKind::Attack | ConditionKind::Damaged => {
                if text.is_empty() || value_type.trim().is_empty() {
                    return ConditionTarget::Any;
                }
                match EnumType::resolve(value_type, ignore_case) {
                    ty @ (EnumType::UnitType | EnumType::UnitCategory) => {
                        ConditionTarget::OpponentFlags {
                            ty,
                            bits: ty.parse(text, ignore_case).unwrap_or(0),
                        }
                    }
                    _ => ConditionTarget::OpponentText(text.to_string()),
                }
            }
            ConditionKind::SpecificSkill => {
                ConditionTarget::Skill(text.parse::<i64>().unwrap_or(0))
            }
            ConditionKind::ApplySubEffect => {
                let tagged = EnumType::resolve(value_type, ignore_case) == EnumType::BattleTag;
                if text.is_empty() || !tagged {
                    return ConditionTarget::Unresolved;
                }
                let tag = EnumType::BattleTag.parse(text, ignore_case).unwrap_or(0);
                ConditionTarget::BattleTag(tag)
            }
            _ => ConditionTarget::Any,
        }
    }

    /// Whether `inputs` satisfy this target under `condition`.
    ///
    /// `first_slot` is the ability's first value slot, consulted only by the
    /// opponent text fallback.
    pub fn is_satisfied(
        &self,
        condition: ConditionKind,
        inputs: &ConditionInputs,
        first_slot: Option<&ValueSlot>,
    ) -> bool {
        match condition {
            ConditionKind::HpLessThan => match self {
                ConditionTarget::HpThreshold { kind, value } => {
                    let hp = inputs.number(0);
                    let hp_max = inputs.number(1);
                    if kind.contains(ValueKind::RATIO) {
                        hp_max > 0.0 && hp / hp_max <= *value
                    } else if kind.contains(ValueKind::ABS) {
                        hp <= *value
                    } else {
                        false
                    }
                }
                _ => false,
            },
            ConditionKind::Attack | ConditionKind::Damaged => {
                self.matches_opponent(inputs.get(0), inputs.get(1), first_slot)
            }
            ConditionKind::SpecificSkill => match self {
                ConditionTarget::Skill(id) if *id > 0 => {
                    inputs.get(0).is_some_and(|skill| skill.as_i64() == *id)
                }
                ConditionTarget::Skill(_) => true,
                _ => false,
            },
            ConditionKind::ApplySubEffect => match self {
                ConditionTarget::BattleTag(tag) => {
                    let triggered = inputs
                        .get(0)
                        .and_then(|v| v.enum_bits(EnumType::BattleTag))
                        .unwrap_or(0);
                    triggered == *tag
                }
                _ => false,
            },
            _ => true,
        }
    }

    fn matches_opponent(
        &self,
        unit_type: Option<&Value>,
        category: Option<&Value>,
        first_slot: Option<&ValueSlot>,
    ) -> bool {
        match self {
            ConditionTarget::OpponentFlags { ty, bits } => {
                let input = match ty {
                    EnumType::UnitType => unit_type,
                    _ => category,
                };
                let opponent = input.and_then(|v| v.enum_bits(*ty)).unwrap_or(0);
                has_flag(*bits, opponent)
            }
            ConditionTarget::OpponentText(configured) => match first_slot {
                Some(slot) if slot.value.is_text() => configured
                    .to_lowercase()
                    .contains(&SLOT_SEQUENCE_LABEL.to_lowercase()),
                _ => true,
            },
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<RecordValue> {
        Some(RecordValue::Text(s.to_string()))
    }

    #[test]
    fn hp_threshold_requires_known_value_type() {
        let low_hp = ConditionKind::HpLessThan;
        let threshold = text("0.5");
        let target = ConditionTarget::resolve(low_hp, "RATIO", threshold.as_ref(), false);
        let expected = ConditionTarget::HpThreshold {
            kind: ValueKind::RATIO,
            value: 0.5,
        };
        assert_eq!(target, expected);

        let unresolved = ConditionTarget::resolve(low_hp, "PERCENT", threshold.as_ref(), true);
        assert_eq!(unresolved, ConditionTarget::Unresolved);
        let dying = ConditionInputs::hp(1, 10);
        assert!(!unresolved.is_satisfied(low_hp, &dying, None));
    }

    #[test]
    fn hp_ratio_and_absolute() {
        let low_hp = ConditionKind::HpLessThan;
        let hp = |current, max| ConditionInputs::hp(current, max);
        let ratio = ConditionTarget::HpThreshold {
            kind: ValueKind::RATIO,
            value: 0.3,
        };
        assert!(ratio.is_satisfied(low_hp, &hp(30, 100), None));
        assert!(!ratio.is_satisfied(low_hp, &hp(31, 100), None));
        assert!(!ratio.is_satisfied(low_hp, &hp(0, 0), None));

        let abs = ConditionTarget::HpThreshold {
            kind: ValueKind::ABS,
            value: 50.0,
        };
        assert!(abs.is_satisfied(low_hp, &hp(50, 100), None));
        assert!(!abs.is_satisfied(low_hp, &hp(51, 100), None));
    }

    #[test]
    fn opponent_flags_containment() {
        let attack = ConditionKind::Attack;
        let flags = text("MELEE|FLYING");
        let target = ConditionTarget::resolve(attack, "UnitType", flags.as_ref(), false);
        let melee = ConditionInputs::opponent(1, 0);
        let ranged = ConditionInputs::opponent(2, 0);
        assert!(target.is_satisfied(attack, &melee, None));
        assert!(!target.is_satisfied(attack, &ranged, None));

        let damaged = ConditionKind::Damaged;
        let undead = text("UNDEAD");
        let by_category = ConditionTarget::resolve(damaged, "UnitCategory", undead.as_ref(), false);
        let ghoul = ConditionInputs::opponent(2, 4);
        let knight = ConditionInputs::opponent(2, 1);
        assert!(by_category.is_satisfied(damaged, &ghoul, None));
        assert!(!by_category.is_satisfied(damaged, &knight, None));
    }

    #[test]
    fn empty_opponent_config_matches_anything() {
        let attack = ConditionKind::Attack;
        let target = ConditionTarget::resolve(attack, "UnitType", None, false);
        assert_eq!(target, ConditionTarget::Any);
        assert!(target.is_satisfied(attack, &ConditionInputs::none(), None));
    }

    #[test]
    fn skill_zero_means_any() {
        let skill = ConditionKind::SpecificSkill;
        let none = ConditionInputs::none();
        let any = ConditionTarget::Skill(0);
        assert!(any.is_satisfied(skill, &none, None));

        let fireball = ConditionTarget::Skill(7001);
        let cast = |id| ConditionInputs::skill(id);
        assert!(fireball.is_satisfied(skill, &cast(7001), None));
        assert!(!fireball.is_satisfied(skill, &cast(7002), None));
        assert!(!fireball.is_satisfied(skill, &none, None));
    }

    #[test]
    fn battle_tag_exact_match() {
        let sub_effect = ConditionKind::ApplySubEffect;
        let poison = text("POISON");
        let target = ConditionTarget::resolve(sub_effect, "BattleTag", poison.as_ref(), false);
        assert_eq!(target, ConditionTarget::BattleTag(2));
        let poisoned = ConditionInputs::battle_tag("POISON");
        let burning = ConditionInputs::battle_tag("BURN");
        assert!(target.is_satisfied(sub_effect, &poisoned, None));
        assert!(!target.is_satisfied(sub_effect, &burning, None));

        let wrong_type = ConditionTarget::resolve(sub_effect, "UnitType", poison.as_ref(), false);
        assert_eq!(wrong_type, ConditionTarget::Unresolved);
    }
}
