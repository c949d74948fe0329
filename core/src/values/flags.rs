//! Enum flag tables
//!
//! Enum-typed values (unit types, unit categories, battle tags) are resolved
//! against these static tables once, when metadata is loaded. An unknown
//! table name resolves to [`EnumType::Unknown`], which makes enum slots pass
//! their input through unchanged.

use phf::phf_map;
use std::fmt;

/// Closed set of enum tables an ability may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumType {
    UnitType,
    UnitCategory,
    BattleTag,
    Unknown,
}

impl EnumType {
    /// Resolve a table name as written in metadata ("UnitType", "eUnitType", "unit_type").
    pub fn resolve(name: &str, ignore_case: bool) -> EnumType {
        let trimmed = name.trim();
        let trimmed = trimmed
            .strip_prefix('e')
            .filter(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
            .unwrap_or(trimmed);

        let key: String = trimmed.chars().filter(|c| *c != '_').collect();
        let matches = |candidate: &str| {
            if ignore_case {
                key.eq_ignore_ascii_case(candidate)
            } else {
                key == candidate
            }
        };

        if matches("UnitType") {
            EnumType::UnitType
        } else if matches("UnitCategory") {
            EnumType::UnitCategory
        } else if matches("BattleTag") {
            EnumType::BattleTag
        } else {
            EnumType::Unknown
        }
    }

    fn table(self) -> Option<&'static phf::Map<&'static str, i64>> {
        match self {
            EnumType::UnitType => Some(&UNIT_TYPE),
            EnumType::UnitCategory => Some(&UNIT_CATEGORY),
            EnumType::BattleTag => Some(&BATTLE_TAG),
            EnumType::Unknown => None,
        }
    }

    /// Flag tables combine names with `|`; plain tables hold one value.
    pub fn is_flags(self) -> bool {
        matches!(self, EnumType::UnitType | EnumType::UnitCategory)
    }

    pub fn is_known(self) -> bool {
        self != EnumType::Unknown
    }

    /// Parse a name list (`"MELEE|RANGED"`, `"MELEE, RANGED"`) or a raw number.
    ///
    /// Returns `None` for unknown tables, empty input, or any unknown name.
    pub fn parse(self, text: &str, ignore_case: bool) -> Option<i64> {
        let table = self.table()?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(bits) = text.parse::<i64>() {
            return Some(bits);
        }

        let parts = text
            .split(['|', ','])
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let mut bits = 0;
        for part in parts {
            let value = if ignore_case {
                table.get(part.to_ascii_uppercase().as_str())
            } else {
                table.get(part)
            };
            bits |= *value?;
        }
        Some(bits)
    }

    /// Render bits back into table names.
    pub fn format(self, bits: i64) -> String {
        let Some(table) = self.table() else {
            return bits.to_string();
        };

        if let Some((name, _)) = table.entries().find(|(_, v)| **v == bits) {
            return (*name).to_string();
        }

        if self.is_flags() && bits > 0 {
            let mut names: Vec<(&str, i64)> = table
                .entries()
                .filter(|(_, v)| **v != 0 && bits & **v == **v)
                .map(|(k, v)| (*k, *v))
                .collect();
            names.sort_by_key(|(_, v)| *v);
            let covered = names.iter().fold(0, |acc, (_, v)| acc | v);
            if covered == bits {
                return names.iter().map(|(k, _)| *k).collect::<Vec<_>>().join("|");
            }
        }

        bits.to_string()
    }
}

impl fmt::Display for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnumType::UnitType => "UnitType",
            EnumType::UnitCategory => "UnitCategory",
            EnumType::BattleTag => "BattleTag",
            EnumType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Set `flags` on `value`.
pub fn set_flag(value: i64, flags: i64) -> i64 {
    value | flags
}

/// Clear `flags` from `value`.
pub fn unset_flag(value: i64, flags: i64) -> i64 {
    value & !flags
}

/// Flag containment: every bit of `flags` is present in `value`.
pub fn has_flag(value: i64, flags: i64) -> bool {
    value & flags == flags
}

// ═══════════════════════════════════════════════════════════════════════════
// Tables
// ═══════════════════════════════════════════════════════════════════════════

static UNIT_TYPE: phf::Map<&'static str, i64> = phf_map! {
    "N" => 0,
    "MELEE" => 1 << 0,
    "RANGED" => 1 << 1,
    "MAGIC" => 1 << 2,
    "FLYING" => 1 << 3,
    "SIEGE" => 1 << 4,
    "HERO" => 1 << 5,
    "BOSS" => 1 << 6,
};

static UNIT_CATEGORY: phf::Map<&'static str, i64> = phf_map! {
    "N" => 0,
    "HUMAN" => 1 << 0,
    "BEAST" => 1 << 1,
    "UNDEAD" => 1 << 2,
    "MACHINE" => 1 << 3,
    "SPIRIT" => 1 << 4,
    "DRAGON" => 1 << 5,
};

static BATTLE_TAG: phf::Map<&'static str, i64> = phf_map! {
    "NONE" => 0,
    "STUN" => 1,
    "POISON" => 2,
    "BURN" => 3,
    "FREEZE" => 4,
    "SHIELD" => 5,
    "HEAL" => 6,
    "KNOCKBACK" => 7,
    "SILENCE" => 8,
};
