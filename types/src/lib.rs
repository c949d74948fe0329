//! Shared ability data types for EVO
//!
//! This crate contains the serializable schema shared between the engine
//! (evo-core), the scenario validator and the interactive shell: the
//! condition/change/value kinds, the raw ability records read from metadata
//! files, and the engine configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Conditions
// ─────────────────────────────────────────────────────────────────────────────

/// Trigger category gating an ability's activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionKind {
    /// Active for the owner's whole lifetime
    Always,
    /// Owner entered the field
    Spawn,
    /// Owner died
    Death,
    /// Owner stands in its home zone
    InHome,
    /// Owner stands in the opposing zone
    InAway,
    /// Owner HP dropped under a ratio or absolute threshold
    HpLessThan,
    /// Owner attacked a unit matching the configured type/category
    Attack,
    /// Owner was damaged by a unit matching the configured type/category
    #[serde(alias = "DMGED")]
    Damaged,
    /// A specific skill (or any skill, when configured as 0) was used
    SpecificSkill,
    /// A sub effect carrying the configured battle tag was applied
    ApplySubEffect,
    /// Wildcard used by callers: matches every ability's condition
    All,
    /// Invalid definition; never activates
    #[default]
    None,
}

impl ConditionKind {
    /// The zone condition that is mutually exclusive with this one, if any.
    pub fn opposite_zone(self) -> Option<ConditionKind> {
        match self {
            ConditionKind::InHome => Some(ConditionKind::InAway),
            ConditionKind::InAway => Some(ConditionKind::InHome),
            _ => None,
        }
    }

    /// Conditions whose applied state survives post-evaluation.
    pub fn is_persistent(self) -> bool {
        matches!(
            self,
            ConditionKind::Always
                | ConditionKind::Spawn
                | ConditionKind::Death
                | ConditionKind::InHome
                | ConditionKind::InAway
        )
    }

    /// Whether a request for `requested` reaches an ability configured with `self`.
    pub fn is_requested_by(self, requested: ConditionKind) -> bool {
        requested == ConditionKind::All || requested == self
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionKind::Always => "ALWAYS",
            ConditionKind::Spawn => "SPAWN",
            ConditionKind::Death => "DEATH",
            ConditionKind::InHome => "IN_HOME",
            ConditionKind::InAway => "IN_AWAY",
            ConditionKind::HpLessThan => "HP_LESS_THAN",
            ConditionKind::Attack => "ATTACK",
            ConditionKind::Damaged => "DAMAGED",
            ConditionKind::SpecificSkill => "SPECIFIC_SKILL",
            ConditionKind::ApplySubEffect => "APPLY_SUB_EFFECT",
            ConditionKind::All => "ALL",
            ConditionKind::None => "NONE",
        };
        f.write_str(name)
    }
}

impl FromStr for ConditionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_uppercase().as_str() {
            "ALWAYS" => ConditionKind::Always,
            "SPAWN" => ConditionKind::Spawn,
            "DEATH" => ConditionKind::Death,
            "IN_HOME" => ConditionKind::InHome,
            "IN_AWAY" => ConditionKind::InAway,
            "HP_LESS_THAN" => ConditionKind::HpLessThan,
            "ATTACK" => ConditionKind::Attack,
            "DAMAGED" | "DMGED" => ConditionKind::Damaged,
            "SPECIFIC_SKILL" => ConditionKind::SpecificSkill,
            "APPLY_SUB_EFFECT" => ConditionKind::ApplySubEffect,
            "ALL" => ConditionKind::All,
            "NONE" => ConditionKind::None,
            other => return Err(format!("unknown condition '{other}'")),
        };
        Ok(kind)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Change / Value Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// How a value slot affects its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    #[default]
    Increase,
    Decrease,
    Enable,
    Disable,
    Change,
}

/// Value combination policy, as a set of bit flags.
///
/// Serialized as a `|`-separated list of flag names, e.g. `"RATIO|ACCUMULATE"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValueKind(u8);

impl ValueKind {
    pub const NONE: ValueKind = ValueKind(0);
    pub const RATIO: ValueKind = ValueKind(1 << 0);
    pub const ABS: ValueKind = ValueKind(1 << 1);
    pub const ACCUMULATE: ValueKind = ValueKind(1 << 2);
    pub const MULTIPLY: ValueKind = ValueKind(1 << 3);
    pub const COMPOUND_INTEREST: ValueKind = ValueKind(1 << 4);

    const NAMES: [(&'static str, ValueKind); 5] = [
        ("RATIO", ValueKind::RATIO),
        ("ABS", ValueKind::ABS),
        ("ACCUMULATE", ValueKind::ACCUMULATE),
        ("MULTIPLY", ValueKind::MULTIPLY),
        ("COMPOUND_INTEREST", ValueKind::COMPOUND_INTEREST),
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True when every flag of `other` is set (NONE is always contained).
    pub fn contains(self, other: ValueKind) -> bool {
        self.0 & other.0 == other.0
    }

    /// Activations stack: each activation bumps the applied counter.
    pub fn stacks(self) -> bool {
        self.contains(ValueKind::ACCUMULATE) || self.contains(ValueKind::COMPOUND_INTEREST)
    }

    /// Parse a flag list such as `"RATIO|ACCUMULATE"` or `"RATIO, ACCUMULATE"`.
    ///
    /// Returns `None` if any name is unknown.
    pub fn parse(s: &str, ignore_case: bool) -> Option<ValueKind> {
        let mut kind = ValueKind::NONE;
        for part in s.split(['|', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("NONE") && (ignore_case || part == "NONE") {
                continue;
            }
            let (_, flag) = Self::NAMES.iter().find(|(name, _)| {
                if ignore_case {
                    name.eq_ignore_ascii_case(part)
                } else {
                    *name == part
                }
            })?;
            kind |= *flag;
        }
        Some(kind)
    }
}

impl BitOr for ValueKind {
    type Output = ValueKind;

    fn bitor(self, rhs: ValueKind) -> ValueKind {
        ValueKind(self.0 | rhs.0)
    }
}

impl BitOrAssign for ValueKind {
    fn bitor_assign(&mut self, rhs: ValueKind) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ValueKind {
    type Output = ValueKind;

    fn bitand(self, rhs: ValueKind) -> ValueKind {
        ValueKind(self.0 & rhs.0)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("NONE");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueKind({self})")
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueKind::parse(s, true).ok_or_else(|| format!("unknown value type '{s}'"))
    }
}

impl TryFrom<String> for ValueKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> String {
        kind.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ability Types
// ─────────────────────────────────────────────────────────────────────────────

/// Classification of what stat an ability modifies; the lookup key consumers use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityType(String);

impl AbilityType {
    pub const ATK_DMG: &'static str = "ATK_DMG";
    pub const ATK_DMG_POS: &'static str = "ATK_DMG_POS";
    pub const SPECIFIC_SKILL_META_DATA: &'static str = "SPECIFIC_SKILL_META_DATA";
    pub const SPECIFIC_SKILL_META_DATA_VALUE: &'static str = "SPECIFIC_SKILL_META_DATA_VALUE";
    pub const SUB_EFFECT_META_DATA: &'static str = "SUB_EFFECT_META_DATA";
    pub const SUB_EFFECT_META_DATA_VALUE: &'static str = "SUB_EFFECT_META_DATA_VALUE";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Types that overlay another skill's or sub effect's metadata and keep
    /// their applied state across re-evaluation.
    pub fn is_metadata_overlay(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::SPECIFIC_SKILL_META_DATA
                | Self::SPECIFIC_SKILL_META_DATA_VALUE
                | Self::SUB_EFFECT_META_DATA
                | Self::SUB_EFFECT_META_DATA_VALUE
        )
    }

    /// Types where every applied ability is measured against the original
    /// value and the deltas summed, instead of chaining.
    pub fn applies_from_origin(&self) -> bool {
        matches!(self.0.as_str(), Self::ATK_DMG | Self::ATK_DMG_POS)
    }
}

impl fmt::Display for AbilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AbilityType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which kind of entity owns an ability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    /// Field unit (character)
    #[default]
    Unit,
    /// Action card held in hand
    ActionCard,
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKind::Unit => f.write_str("unit"),
            OwnerKind::ActionCard => f.write_str("action_card"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw Metadata Records (TOML)
// ─────────────────────────────────────────────────────────────────────────────

/// A scalar or list as written in a metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    List(Vec<RecordValue>),
}

impl RecordValue {
    /// Textual form, as the metadata author wrote it. Lists are comma-joined.
    pub fn to_text(&self) -> String {
        match self {
            RecordValue::Int(v) => v.to_string(),
            RecordValue::Float(v) => v.to_string(),
            RecordValue::Bool(v) => v.to_string(),
            RecordValue::Text(s) => s.clone(),
            RecordValue::List(items) => items
                .iter()
                .map(RecordValue::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl Default for RecordValue {
    fn default() -> Self {
        RecordValue::Text(String::new())
    }
}

/// How a value slot is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Single numeric value
    #[default]
    Number,
    /// Enum flag value; `enum_type` names the flag table
    Enum,
    /// Free text, replaces the target while applied
    Text,
    /// Composite/array value
    Sequence,
}

/// One value slot of an ability record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRecord {
    #[serde(default)]
    pub kind: SlotKind,

    #[serde(default)]
    pub value: RecordValue,

    /// Flag table name for enum slots (e.g. "UnitType")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<String>,

    /// Per-slot change type (defaults to the ability's `change_type`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<ChangeKind>,

    /// Per-slot external change type (defaults to the ability's)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_change_type: Option<ChangeKind>,
}

/// One ability as written in a metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityRecord {
    pub meta_id: i32,

    /// Meta ID of the unit or action card this ability belongs to
    pub owner_meta_id: i32,

    #[serde(default)]
    pub owner_kind: OwnerKind,

    // ─── Classification ─────────────────────────────────────────────────────
    pub ability_type: AbilityType,

    #[serde(default)]
    pub ability_sub_type: String,

    // ─── Trigger ────────────────────────────────────────────────────────────
    #[serde(default)]
    pub condition: ConditionKind,

    /// Interpretation of `condition_value` ("RATIO", "UnitType", "BattleTag", ...)
    #[serde(default)]
    pub condition_value_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_value: Option<RecordValue>,

    // ─── Value policy ───────────────────────────────────────────────────────
    #[serde(default)]
    pub change_type: ChangeKind,

    #[serde(default)]
    pub value_type: ValueKind,

    /// Payload key folded into the magnitude before it is applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_apply_type: Option<String>,

    #[serde(default)]
    pub external_change_type: ChangeKind,

    #[serde(default)]
    pub external_value_type: ValueKind,

    /// Skill or sub effect targeted by metadata overlay types (0 = none)
    #[serde(default)]
    pub apply_meta_id: i32,

    // ─── Timing ─────────────────────────────────────────────────────────────
    /// Uses before the ability exhausts (0 = unlimited)
    #[serde(default)]
    pub count: u32,

    /// Seconds the ability stays applied (0 = until deactivated)
    #[serde(default, alias = "time")]
    pub duration: f32,

    /// Seconds before the ability can re-activate (0 = none)
    #[serde(default)]
    pub cool_time: f32,

    #[serde(default)]
    pub values: Vec<ValueRecord>,
}

/// Root structure for ability metadata files (TOML)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityConfig {
    #[serde(default, rename = "ability")]
    pub abilities: Vec<AbilityRecord>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory scanned for ability metadata files
    #[serde(default)]
    pub definitions_dir: String,

    /// Match enum flag names regardless of case when resolving metadata
    #[serde(default = "default_true")]
    pub case_insensitive_enums: bool,

    /// Debug-level logging for evo crates
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            definitions_dir: String::new(),
            case_insensitive_enums: true,
            debug_logging: false,
        }
    }
}

impl EngineConfig {
    pub fn with_definitions_dir(definitions_dir: impl Into<String>) -> Self {
        Self {
            definitions_dir: definitions_dir.into(),
            ..Self::default()
        }
    }
}
