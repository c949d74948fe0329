use std::collections::BTreeMap;
use std::path::PathBuf;

use evo_core::{
    AbilityCatalog, AbilitySet, EngineConfig, EngineConfigExt, HostBinding, LoaderError, OwnerKind,
    StatSheet, load_catalog,
};

/// Ability set of one spawned owner, applying to its stat sheet
pub type OwnerSet = AbilitySet<HostBinding<StatSheet>>;

/// Shell session: loaded catalog plus every spawned owner
#[derive(Default)]
pub struct AppState {
    pub config: EngineConfig,
    pub catalog: AbilityCatalog,
    pub catalog_dir: Option<PathBuf>,
    pub owners: BTreeMap<i32, OwnerSet>,
    pub elapsed_secs: f32,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::load_or_default(),
            ..Self::default()
        }
    }

    /// Replace the catalog with every definition under `dir`
    /// (the configured directory when `None`)
    pub fn load_catalog(&mut self, dir: Option<PathBuf>) -> Result<usize, String> {
        let dir = dir
            .or_else(|| self.config.definitions_path())
            .ok_or("no definitions directory configured")?;
        let catalog = load_catalog(&dir, self.config.case_insensitive_enums)
            .map_err(|e: LoaderError| e.to_string())?;
        let count = catalog.len();
        self.catalog = catalog;
        self.catalog_dir = Some(dir);
        Ok(count)
    }

    /// Create (or replace) an owner. Empty `abilities` takes every catalog
    /// ability registered for the owner.
    pub fn spawn(
        &mut self,
        kind: OwnerKind,
        meta_id: i32,
        abilities: &[i32],
        sheet: StatSheet,
    ) -> usize {
        let definitions = if abilities.is_empty() {
            self.catalog.definitions_for_owner(kind, meta_id)
        } else {
            self.catalog.definitions_for_ids(abilities)
        };
        let set = AbilitySet::new(meta_id, &definitions, HostBinding::new(kind, sheet));
        let count = set.len();
        if self.owners.insert(meta_id, set).is_some() {
            tracing::debug!(owner = meta_id, "Replaced existing owner");
        }
        count
    }

    pub fn owner_mut(&mut self, meta_id: i32) -> Result<&mut OwnerSet, String> {
        self.owners
            .get_mut(&meta_id)
            .ok_or_else(|| format!("no owner {meta_id} spawned"))
    }

    /// Advance every owner by `delta` seconds. Returns expired instances.
    pub fn tick(&mut self, delta: f32) -> usize {
        self.elapsed_secs += delta;
        self.owners.values_mut().map(|set| set.tick(delta)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_core::{ConditionInputs, ConditionKind, load_definitions_from_str};
    use std::path::Path;

    const SAMPLE: &str = r#"
[[ability]]
meta_id = 1001
owner_meta_id = 10
ability_type = "ATK"
condition = "ALWAYS"
value_type = "ABS"
duration = 2.0
values = [{ value = 5 }]
"#;

    fn state() -> AppState {
        let defs = load_definitions_from_str(SAMPLE, Path::new("sample.toml"), true).unwrap();
        let mut state = AppState::default();
        state.catalog.add_definitions(defs, false);
        state
    }

    #[test]
    fn spawn_picks_owner_abilities() {
        let mut state = state();
        let sheet = StatSheet::new(OwnerKind::Unit, 10).with_stat("ATK", 10);
        assert_eq!(state.spawn(OwnerKind::Unit, 10, &[], sheet), 1);
        assert!(state.owner_mut(10).is_ok());
        assert!(state.owner_mut(11).is_err());
    }

    #[test]
    fn tick_reaches_every_owner() {
        let mut state = state();
        let sheet = StatSheet::new(OwnerKind::Unit, 10).with_stat("ATK", 10);
        state.spawn(OwnerKind::Unit, 10, &[1001], sheet);

        let set = state.owner_mut(10).unwrap();
        let none = ConditionInputs::none();
        set.evaluate(ConditionKind::Always, true, false, &none, None);
        assert_eq!(set.binding().host().stat_f32("ATK"), 15.0);

        assert_eq!(state.tick(2.5), 1);
        assert_eq!(state.elapsed_secs, 2.5);
        let set = state.owner_mut(10).unwrap();
        assert_eq!(set.binding().host().stat_f32("ATK"), 10.0);
    }
}
