//! Ability catalog
//!
//! All loaded definitions keyed by meta ID, in load order. Owners look up
//! their abilities here when an ability set is built.

use indexmap::IndexMap;

use evo_types::OwnerKind;

use super::AbilityDefinition;

#[derive(Debug, Clone, Default)]
pub struct AbilityCatalog {
    abilities: IndexMap<i32, AbilityDefinition>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add definitions. If `overwrite` is true, replaces existing definitions with same ID.
    /// Returns IDs of duplicates that were encountered (skipped if !overwrite, replaced if overwrite).
    pub fn add_definitions(
        &mut self,
        definitions: Vec<AbilityDefinition>,
        overwrite: bool,
    ) -> Vec<i32> {
        let mut duplicates = Vec::new();
        for def in definitions {
            if !def.is_valid() {
                tracing::warn!(
                    meta_id = def.meta_id,
                    ability_type = %def.ability_type,
                    "Ability has no condition and will never activate"
                );
            }

            if self.abilities.contains_key(&def.meta_id) {
                duplicates.push(def.meta_id);
                if !overwrite {
                    continue;
                }
            }
            self.abilities.insert(def.meta_id, def);
        }

        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, overwrite, "Duplicate ability IDs");
        }
        duplicates
    }

    pub fn get(&self, meta_id: i32) -> Option<&AbilityDefinition> {
        self.abilities.get(&meta_id)
    }

    /// Definitions belonging to one owner, in load order
    pub fn definitions_for_owner(
        &self,
        kind: OwnerKind,
        owner_meta_id: i32,
    ) -> Vec<AbilityDefinition> {
        self.abilities
            .values()
            .filter(|def| def.owner_kind == kind && def.owner_meta_id == owner_meta_id)
            .cloned()
            .collect()
    }

    /// Definitions for an explicit ID list. Zero and unknown IDs are skipped.
    pub fn definitions_for_ids(&self, ids: &[i32]) -> Vec<AbilityDefinition> {
        ids.iter()
            .filter(|id| **id != 0)
            .filter_map(|id| {
                let def = self.abilities.get(id);
                if def.is_none() {
                    tracing::debug!(meta_id = id, "Unknown ability ID skipped");
                }
                def.cloned()
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities.values()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}
